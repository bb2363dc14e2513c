//! # mgnlt_ec2
//!
//! EC2 launch template access for mgnlt.
//!
//! This crate wraps the four control-plane operations the tool needs behind the
//! [`Ec2Api`] trait, with two implementations:
//!
//! - **[`AwsCliClient`]**: drives the AWS CLI; region, profile and endpoint come from
//!   [`AwsCliOptions`] instead of ambient process state
//! - **[`MockEc2`]**: in-memory templates for tests, with call capture
//!
//! # Example
//!
//! ```rust,no_run
//! use mgnlt_ec2::{AwsCliClient, AwsCliOptions, Ec2Api};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AwsCliClient::new(AwsCliOptions::new("us-east-2").profile("migration"));
//!
//!     for template in client.describe_launch_templates().await? {
//!         println!("{} {}", template.launch_template_id, template.launch_template_name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod mock;
pub mod models;

pub use api::Ec2Api;
pub use cli::AwsCliClient;
pub use config::AwsCliOptions;
pub use error::{Ec2Error, Ec2Result};
pub use mock::{CapturedCall, MockEc2};
pub use models::{name_tag, LaunchTemplate, ModifyResponse, Tag, TemplateRecord, NAME_TAG_KEY};
