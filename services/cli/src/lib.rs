mod cli;
mod render;
mod report;

use compliance_engine::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
