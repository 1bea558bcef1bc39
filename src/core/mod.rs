pub mod audit;
pub mod discovery;
pub mod matcher;
pub mod pipeline;
pub mod report;
pub mod responses;
pub mod sections;
pub mod title;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{AuditMode, FragmentReference, Harvest, Report};
pub use crate::domain::ports::{ConfigProvider, Pipeline, QueryParams, WikiApi};
pub use crate::utils::error::Result;
