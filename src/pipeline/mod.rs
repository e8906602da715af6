pub mod driver;
pub mod report;

pub use driver::MoversPipeline;
pub use report::MoversReport;
