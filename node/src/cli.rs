//! # CLI Interface
//!
//! Command-line structure for `donation-node` using `clap` derive. Every
//! option can also come from the environment, which is how the merchant
//! secrets are expected to arrive in deployment.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use donation_protocol::config::{
    GatewayEndpoints, Profile, DEFAULT_FAILURE_URL, DEFAULT_SUCCESS_URL, LIVE_PAYMENT_URL,
    TEST_PAYMENT_URL,
};
use donation_protocol::{MerchantCredentials, ProtocolError};

/// Donation payment signer.
///
/// Signs donation requests for a hosted payment gateway and verifies the
/// gateway's status callbacks.
#[derive(Parser, Debug)]
#[command(
    name = "donation-node",
    about = "Signs donation payments and verifies gateway callbacks",
    version,
    propagate_version = true
)]
pub struct DonationNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP service.
    Run(RunArgs),
    /// Sign one request read from a JSON file (or stdin) and print the payload.
    Sign(SignArgs),
    /// Print version information and exit.
    Version,
}

/// Gateway and credential options shared by `run` and `sign`.
#[derive(Args, Debug, Clone)]
pub struct GatewayArgs {
    /// Deployment profile: `development` or `production`.
    ///
    /// Production refuses to start without merchant credentials.
    #[arg(long, env = "DONATION_PROFILE", default_value = "production")]
    pub profile: Profile,

    /// Merchant key issued by the gateway.
    #[arg(long, env = "PAYU_MERCHANT_KEY", hide_env_values = true)]
    pub merchant_key: Option<String>,

    /// Merchant salt issued by the gateway. Never pass this flag on a shared
    /// machine; prefer the environment variable.
    #[arg(long, env = "PAYU_MERCHANT_SALT", hide_env_values = true)]
    pub merchant_salt: Option<String>,

    /// Hosted checkout URL. Defaults to the sandbox in development and the
    /// live gateway in production.
    #[arg(long, env = "PAYU_PAYMENT_URL")]
    pub payment_url: Option<String>,

    /// Where the gateway sends donors after a successful payment (`surl`).
    #[arg(long, env = "DONATION_SUCCESS_URL", default_value = DEFAULT_SUCCESS_URL)]
    pub success_url: String,

    /// Where the gateway sends donors after a failed payment (`furl`).
    #[arg(long, env = "DONATION_FAILURE_URL", default_value = DEFAULT_FAILURE_URL)]
    pub failure_url: String,
}

impl GatewayArgs {
    /// Resolves the configured endpoints, picking the checkout URL by profile
    /// when none was given.
    pub fn endpoints(&self) -> GatewayEndpoints {
        let payment_url = self.payment_url.clone().unwrap_or_else(|| {
            if self.profile.is_production() {
                LIVE_PAYMENT_URL.to_string()
            } else {
                TEST_PAYMENT_URL.to_string()
            }
        });
        GatewayEndpoints {
            payment_url,
            success_url: self.success_url.clone(),
            failure_url: self.failure_url.clone(),
        }
    }

    /// Loads credentials, applying the profile's startup gate.
    pub fn credentials(&self) -> Result<Option<MerchantCredentials>, ProtocolError> {
        MerchantCredentials::load(
            self.merchant_key.clone(),
            self.merchant_salt.clone(),
            self.profile,
        )
    }
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub gateway: GatewayArgs,

    /// Port for the HTTP API.
    #[arg(long, env = "DONATION_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "DONATION_METRICS_PORT", default_value_t = 3001)]
    pub metrics_port: u16,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "DONATION_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Include diagnostic detail (panic messages, computed callback hashes)
    /// in API responses. Rejected under the production profile.
    #[arg(long, env = "DONATION_EXPOSE_ERROR_DETAIL")]
    pub expose_error_detail: bool,
}

/// Arguments for the `sign` subcommand.
#[derive(Parser, Debug)]
pub struct SignArgs {
    #[command(flatten)]
    pub gateway: GatewayArgs,

    /// JSON file holding the donation request. Reads stdin when omitted or `-`.
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Transaction id to sign with. Overrides any `txnId` in the request.
    #[arg(long)]
    pub txnid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        DonationNodeCli::command().debug_assert();
    }

    #[test]
    fn run_defaults() {
        let cli = DonationNodeCli::try_parse_from([
            "donation-node",
            "run",
            "--merchant-key",
            "k",
            "--merchant-salt",
            "s",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.port, 3000);
        assert_eq!(args.gateway.profile, Profile::Production);
        assert_eq!(args.gateway.endpoints().payment_url, LIVE_PAYMENT_URL);
        assert!(args.gateway.credentials().unwrap().is_some());
    }

    #[test]
    fn development_defaults_to_sandbox() {
        let cli = DonationNodeCli::try_parse_from([
            "donation-node",
            "sign",
            "--profile",
            "development",
        ])
        .unwrap();
        let Commands::Sign(args) = cli.command else {
            panic!("expected sign");
        };
        assert_eq!(args.gateway.endpoints().payment_url, TEST_PAYMENT_URL);
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let parsed =
            DonationNodeCli::try_parse_from(["donation-node", "run", "--profile", "staging"]);
        assert!(parsed.is_err());
    }
}
