//! Kefu: operator entry point.
//!
//! Connects to SurrealDB, applies migrations and drives the
//! provisioning and login workflows from the command line. Results are
//! printed to stdout as JSON; logs go to stderr.

mod settings;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use kefu_auth::{
    AccountProfile, AdminRegistration, AuthService, LoginInput, ProvisioningService,
    StaffRegistration, VerificationService,
};
use kefu_core::error::KefuError;
use kefu_core::models::community::CreateCommunity;
use kefu_core::repository::CommunityRepository;
use kefu_db::Store;
use kefu_im::ImClient;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "kefu", about = "Customer-service account provisioning and login")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending schema migrations and exit.
    Migrate,
    /// Issue a verification code for an administrator email.
    IssueCode {
        #[arg(long)]
        email: String,
    },
    /// Create a community together with its administrator.
    CreateAdmin {
        /// Code previously issued for the administrator email.
        #[arg(long)]
        code: String,
        #[arg(long)]
        community_name: String,
        #[arg(long)]
        community_email: String,
        #[arg(long)]
        community_avatar: Option<String>,
        #[arg(long)]
        community_description: Option<String>,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Create a staff account in an existing community.
    CreateStaff {
        #[arg(long)]
        community_id: u64,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Log in and print both the session token and the IM token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "KEFU_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    nickname: String,
    #[arg(long)]
    avatar: Option<String>,
    #[arg(long, env = "KEFU_PASSWORD", hide_env_values = true)]
    password: String,
}

impl From<ProfileArgs> for AccountProfile {
    fn from(args: ProfileArgs) -> Self {
        Self {
            email: args.email,
            nickname: args.nickname,
            avatar: args.avatar,
            password: args.password,
        }
    }
}

#[derive(Serialize)]
struct IssuedCode<'a> {
    email: &'a str,
    code: String,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kefu=info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let settings = Settings::load()?;

    let store = Store::connect(&settings.db_config())
        .await
        .context("failed to open the kefu store")?;

    let auth_config = settings.auth_config()?;
    let im = ImClient::new(&settings.im_config()).context("failed to build IM client")?;

    match cli.command {
        Command::Migrate => {
            tracing::info!("Migrations applied");
        }
        Command::IssueCode { email } => {
            let codes = VerificationService::new(store.verification_codes(), &auth_config);
            let code = codes.issue_code(&email).await?;
            print_json(&IssuedCode {
                email: &email,
                code,
            })?;
        }
        Command::CreateAdmin {
            code,
            community_name,
            community_email,
            community_avatar,
            community_description,
            profile,
        } => {
            let provisioning = ProvisioningService::new(
                store.users(),
                store.communities(),
                store.verification_codes(),
                im,
                auth_config,
            );
            let account = provisioning
                .create_admin(AdminRegistration {
                    code,
                    community: CreateCommunity {
                        name: community_name,
                        email: community_email,
                        avatar: community_avatar,
                        description: community_description,
                    },
                    profile: profile.into(),
                })
                .await?;
            print_json(&account)?;
        }
        Command::CreateStaff {
            community_id,
            profile,
        } => {
            store
                .communities()
                .get_by_id(community_id)
                .await
                .with_context(|| format!("community {community_id} does not exist"))?;

            let provisioning = ProvisioningService::new(
                store.users(),
                store.communities(),
                store.verification_codes(),
                im,
                auth_config,
            );
            let account = provisioning
                .create_staff(StaffRegistration {
                    community_id,
                    profile: profile.into(),
                })
                .await?;
            print_json(&account)?;
        }
        Command::Login { email, password } => {
            let auth = AuthService::new(store.users(), im, auth_config);
            // Callers only ever see the collapsed credential error.
            let result = auth
                .login(LoginInput { email, password })
                .await
                .map_err(KefuError::from)?;
            print_json(&result)?;
        }
    }

    Ok(())
}
