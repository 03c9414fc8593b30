//!
//! cce-access operator tool
//! ------------------------
//! Thin command-line front end over the access engine for operators and scripts:
//! policy checks, credential hashing, and sealing/opening/authorizing tokens with the
//! secret from `CCE_SECRET`. Logs go to stderr; results go to stdout.

use std::env;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use cce_access::identity::{AccessControl, AccessContext, Authenticator, AuthzDecision, Claims, Role, TokenCipher};
use cce_access::{validate_email, validate_password, AccessConfig, HashSettings, PasswordHasher};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} check-password <password>\n  {program} check-email <email>\n  {program} hash <password>\n  {program} verify <stored-hash> <password>\n  {program} seal <email> <role>\n  {program} open <token>\n  {program} authorize <token>\n  {program} revoke <token>\n\nRoles: admin, user, facilitator, analyst\n\nEnvironment:\n  CCE_SECRET               operator secret the token key is derived from (seal/open/authorize/revoke)\n  CCE_CACHE_TTL_SECS       lifetime of cached authorizations (default 3600)\n  CCE_CACHE_TIMEOUT_MS     cache round-trip limit before falling back to decryption (default 250)\n  CCE_REDIS_URL            use Redis for the cache (requires the `redis` feature)\n  CCE_HASH_MEMORY_KIB, CCE_HASH_ITERATIONS, CCE_HASH_PARALLELISM   Argon2id cost\n  RUST_LOG                 log filter (default info)"
    );
}

fn arg<'a>(args: &'a [String], i: usize, what: &str) -> Result<&'a str> {
    args.get(i).map(String::as_str).ok_or_else(|| anyhow!("missing <{}>", what))
}

fn verdict(ok: bool) -> ExitCode {
    println!("{}", if ok { "valid" } else { "invalid" });
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

async fn run(args: &[String]) -> Result<ExitCode> {
    let cmd = arg(args, 1, "command")?;
    match cmd {
        "check-password" => Ok(verdict(validate_password(arg(args, 2, "password")?))),
        "check-email" => Ok(verdict(validate_email(arg(args, 2, "email")?))),
        "hash" => {
            let hasher = PasswordHasher::new(HashSettings::from_env()?)?;
            println!("{}", hasher.hash(arg(args, 2, "password")?)?);
            Ok(ExitCode::SUCCESS)
        }
        "verify" => {
            let hasher = PasswordHasher::new(HashSettings::from_env()?)?;
            let ok = hasher.verify(arg(args, 2, "stored-hash")?, arg(args, 3, "password")?)?;
            println!("{}", if ok { "match" } else { "mismatch" });
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        "seal" => {
            let cfg = AccessConfig::from_env()?;
            let role: Role = arg(args, 3, "role")?.parse()?;
            let cipher = TokenCipher::from_secret(cfg.secret.as_str())?;
            println!("{}", cipher.seal(&Claims::new(arg(args, 2, "email")?, role))?);
            Ok(ExitCode::SUCCESS)
        }
        "open" => {
            let cfg = AccessConfig::from_env()?;
            let cipher = TokenCipher::from_secret(cfg.secret.as_str())?;
            let claims = cipher.open(arg(args, 2, "token")?)?;
            println!("{}", serde_json::to_string(&claims)?);
            Ok(ExitCode::SUCCESS)
        }
        "authorize" => {
            let cfg = AccessConfig::from_env()?;
            let auth = Authenticator::new(AccessContext::from_config(&cfg).await?);
            let decision = auth.authorize_detailed(arg(args, 2, "token")?).await;
            match &decision {
                AuthzDecision::Cached(r) => println!("allowed role={} source=cache", r),
                AuthzDecision::Derived(r) => println!("allowed role={} source=token", r),
                AuthzDecision::Denied(reason) => println!("denied reason={:?}", reason),
            }
            Ok(if decision.is_allowed() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        "revoke" => {
            let cfg = AccessConfig::from_env()?;
            let auth = Authenticator::new(AccessContext::from_config(&cfg).await?);
            let n = auth.revoke(arg(args, 2, "token")?).await?;
            println!("removed {}", n);
            Ok(ExitCode::SUCCESS)
        }
        "-h" | "--help" | "help" => {
            print_usage(&args[0]);
            Ok(ExitCode::SUCCESS)
        }
        other => Err(anyhow!("unknown command '{}'", other)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Init logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "cce-access".to_string());
    if args.len() < 2 {
        print_usage(&program);
        return ExitCode::from(2);
    }
    info!(target: "cce::access", "cce-access {} command={}", env!("CARGO_PKG_VERSION"), args[1]);

    match run(&args).await.with_context(|| format!("{} failed", args[1])) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
