#![allow(dead_code)]

use arbor::app::App;
use arbor::config::PipelineConfig;
use arbor::pipeline::PipelineOwner;

/// Routes `log` output through the test harness so it shows up for failing tests.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn app() -> App {
    init_logger();
    App::default()
}

pub fn app_with(config: PipelineConfig) -> App {
    init_logger();
    App::new(config)
}

pub fn owner(config: PipelineConfig) -> PipelineOwner {
    init_logger();
    PipelineOwner::new(config)
}
