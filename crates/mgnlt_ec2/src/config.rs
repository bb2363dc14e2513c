//! AWS CLI client configuration.

use std::path::PathBuf;

/// Options for the AWS CLI backed client.
///
/// Everything the client needs to reach EC2 is carried here explicitly; credentials
/// still come from the CLI's own resolution chain for the chosen profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsCliOptions {
    /// Region all calls are made against
    pub region: String,
    /// Named profile (`--profile`)
    pub profile: Option<String>,
    /// CLI executable
    pub binary: PathBuf,
    /// Custom EC2 endpoint (`--endpoint-url`)
    pub endpoint_url: Option<String>,
    /// Follow continuation tokens when listing
    pub paginate: bool,
}

impl AwsCliOptions {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
            binary: PathBuf::from("aws"),
            endpoint_url: None,
            paginate: true,
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Only read the first page of listing results.
    pub fn single_page(mut self) -> Self {
        self.paginate = false;
        self
    }

    /// Arguments shared by every invocation, placed after the operation's own.
    pub(crate) fn common_args(&self) -> Vec<String> {
        let mut args = vec![
            "--region".to_string(),
            self.region.clone(),
            "--output".to_string(),
            "json".to_string(),
        ];

        if let Some(profile) = &self.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }

        if let Some(url) = &self.endpoint_url {
            args.push("--endpoint-url".to_string());
            args.push(url.clone());
        }

        args
    }
}
