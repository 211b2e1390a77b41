#[derive(Debug, Clone, clap::Parser)]
pub struct Cfg {
    /// The priority queue implementation to test.
    pub implementation: Implementation,
    /// Number of Producers that will push elements to the queue.
    #[arg(short, long)]
    pub producer_num: usize,
    /// Number of elements each producer will push to the queue during the test.
    #[arg(short, long)]
    pub element_num: usize,
    /// Number of Consumers that will drain elements from the queue.
    #[arg(short, long, default_value_t = 1)]
    pub consumer_num: usize,
    /// Delay between the start of each drain interval.
    #[arg(long, default_value_t = 5)]
    pub drain_interval_ms: u64,
    /// Number of elements that will be drained per batch.
    #[arg(short = 'b', long, default_value_t = 100)]
    pub drain_batch_size: usize,
    /// Hard cap on the test's execution time.
    #[arg(long, default_value_t = 10)]
    pub run_duration_seconds: u64,
    /// Initial capacity of the queue. The heap grows from here as needed.
    #[arg(long, default_value_t = 16, allow_negative_numbers = true)]
    pub initial_capacity: isize,
}

#[derive(Debug, Clone, strum::EnumString, clap::ValueEnum)]
pub enum Implementation {
    #[strum(ascii_case_insensitive)]
    Naive,
    #[strum(ascii_case_insensitive)]
    Heap,
}
