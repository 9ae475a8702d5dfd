//! Natrium CLI - Command line interface.

use std::io::{self, Read, Write};

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use natrium::crypto::{AsymmetricAlgorithm, SharedKey, SignaturePublicKey, SymmetricAlgorithm};
use natrium::paseto::{
    PasetoFooterClaims, PasetoMessage, PasetoPayloadClaims, ValidationRules, Version,
};
use natrium::{Defaults, Natrium};

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "natrium")]
#[command(about = "Natrium CLI - Encrypt, sign and issue tokens from one root key")]
#[command(version)]
struct Cli {
    /// Root key (base64, 32 bytes)
    #[arg(long, env = "NATRIUM_APP_KEY", hide_env_values = true)]
    app_key: Option<String>,

    /// Default symmetric algorithm
    #[arg(long, env = "NATRIUM_SYMMETRIC")]
    symmetric: Option<SymmetricAlgorithm>,

    /// Default asymmetric algorithm
    #[arg(long, env = "NATRIUM_ASYMMETRIC")]
    asymmetric: Option<AsymmetricAlgorithm>,

    /// PASETO version for issued and accepted tokens
    #[arg(long, env = "NATRIUM_PASETO_VERSION")]
    paseto_version: Option<Version>,

    /// Key derivation context
    #[arg(long, global = true)]
    context: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh root key
    Keygen,
    /// Encrypt a message into a text envelope
    Encrypt {
        /// Plaintext (read from stdin if not provided)
        plaintext: Option<String>,
        /// Associated data
        #[arg(long, default_value = "")]
        ad: String,
    },
    /// Decrypt a text envelope
    Decrypt {
        /// Envelope (`natrium:<algorithm>:<payload>`)
        envelope: String,
        /// Associated data
        #[arg(long, default_value = "")]
        ad: String,
    },
    /// Show the public keys and key id for a context
    PublicKey,
    /// PASETO tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Issue an encrypted (local) token
    Issue(ClaimArgs),
    /// Open an encrypted token and validate its claims
    Open {
        /// Token
        token: String,
        #[command(flatten)]
        rules: RuleArgs,
    },
    /// Issue a signed (public) token
    Sign(ClaimArgs),
    /// Verify a signed token and validate its claims
    Verify {
        /// Token
        token: String,
        /// Issuer public key (base64); defaults to the footer kid
        #[arg(long)]
        public_key: Option<String>,
        #[command(flatten)]
        rules: RuleArgs,
    },
}

#[derive(Args)]
struct ClaimArgs {
    /// Subject (`sub`)
    #[arg(long)]
    subject: Option<String>,
    /// Issuer (`iss`)
    #[arg(long)]
    issuer: Option<String>,
    /// Audience (`aud`)
    #[arg(long)]
    audience: Option<String>,
    /// Token identifier (`jti`)
    #[arg(long)]
    token_id: Option<String>,
    /// Lifetime in seconds
    #[arg(long, default_value = "3600")]
    ttl: i64,
    /// Custom claims as key=value; values are parsed as JSON when possible
    #[arg(long = "claim")]
    claims: Vec<String>,
    /// Footer key id (`kid`)
    #[arg(long)]
    kid: Option<String>,
}

#[derive(Args)]
struct RuleArgs {
    /// Accepted issuer (repeatable)
    #[arg(long = "allow-issuer")]
    issuers: Vec<String>,
    /// Accepted subject (repeatable)
    #[arg(long = "allow-subject")]
    subjects: Vec<String>,
    /// Accepted audience (repeatable)
    #[arg(long = "allow-audience")]
    audiences: Vec<String>,
    /// Reject tokens without `exp`
    #[arg(long)]
    require_expiration: bool,
}

// ============================================================================
// Helpers
// ============================================================================

fn defaults(cli: &Cli) -> Defaults {
    let mut defaults = Defaults::default();
    if let Some(symmetric) = cli.symmetric {
        defaults = defaults.with_symmetric(symmetric);
    }
    if let Some(asymmetric) = cli.asymmetric {
        defaults = defaults.with_asymmetric(asymmetric);
    }
    if let Some(version) = cli.paseto_version {
        defaults = defaults.with_paseto_version(version);
    }
    defaults
}

fn build_natrium(cli: &Cli) -> Result<Natrium> {
    let encoded = cli
        .app_key
        .as_ref()
        .context("Root key required. Set NATRIUM_APP_KEY or use --app-key")?;
    let app_key = SharedKey::import(encoded).context("Invalid root key")?;
    let defaults = defaults(cli);
    debug!(
        symmetric = %defaults.symmetric,
        asymmetric = %defaults.asymmetric,
        paseto_version = %defaults.paseto_version,
        "Natrium configured"
    );
    Ok(Natrium::new(app_key, defaults))
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}

fn parse_claim(pair: &str) -> Result<(String, Value)> {
    let Some((key, raw)) = pair.split_once('=') else {
        bail!("Invalid claim: {}. Use format: key=value", pair);
    };
    if key.is_empty() {
        bail!("Claim name cannot be empty");
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn build_claims(args: &ClaimArgs) -> Result<PasetoPayloadClaims> {
    let ttl = Duration::try_seconds(args.ttl).context("ttl out of range")?;
    let mut builder = PasetoPayloadClaims::builder().valid_for(Utc::now(), ttl);

    if let Some(subject) = &args.subject {
        builder = builder.subject(subject);
    }
    if let Some(issuer) = &args.issuer {
        builder = builder.issuer(issuer);
    }
    if let Some(audience) = &args.audience {
        builder = builder.audience(audience);
    }
    if let Some(token_id) = &args.token_id {
        builder = builder.token_id(token_id);
    }
    for pair in &args.claims {
        let (key, value) = parse_claim(pair)?;
        builder = builder.claim(key, value)?;
    }

    builder.build().context("Invalid claims")
}

fn build_footer(args: &ClaimArgs) -> Option<PasetoFooterClaims> {
    args.kid
        .as_ref()
        .map(|kid| PasetoFooterClaims::new().with_key_id(kid))
}

fn build_rules(args: &RuleArgs) -> ValidationRules {
    let mut rules = ValidationRules::new();
    for issuer in &args.issuers {
        rules = rules.allow_issuer(issuer);
    }
    for subject in &args.subjects {
        rules = rules.allow_subject(subject);
    }
    for audience in &args.audiences {
        rules = rules.allow_audience(audience);
    }
    if args.require_expiration {
        rules = rules.require_expiration();
    }
    rules
}

fn print_message(natrium: &Natrium, message: &PasetoMessage, rules: &RuleArgs) -> Result<()> {
    let claims = message.claims()?;
    if !natrium.validate_paseto(&claims, &build_rules(rules)) {
        bail!("Token claims are not valid");
    }

    let output = json!({
        "claims": claims,
        "footer": message.footer_claims()?,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ============================================================================
// Command Handlers
// ============================================================================

fn cmd_keygen() -> Result<()> {
    let key = SharedKey::generate();
    println!("{}", key.export().as_str());
    eprintln!();
    eprintln!("IMPORTANT: Store this key securely and export it as NATRIUM_APP_KEY.");
    Ok(())
}

fn cmd_encrypt(cli: &Cli, plaintext: Option<&str>, ad: &str) -> Result<()> {
    let natrium = build_natrium(cli)?;
    let plaintext = match plaintext {
        Some(text) => text.as_bytes().to_vec(),
        None => read_stdin()?,
    };

    let envelope = natrium.encrypt_string(&plaintext, ad.as_bytes(), cli.context.as_deref())?;
    info!(context = ?cli.context, bytes = plaintext.len(), "Payload encrypted");
    println!("{}", envelope);
    Ok(())
}

fn cmd_decrypt(cli: &Cli, envelope: &str, ad: &str) -> Result<()> {
    let natrium = build_natrium(cli)?;

    let Some(plaintext) =
        natrium.decrypt_string(envelope, ad.as_bytes(), cli.context.as_deref())?
    else {
        bail!("Decryption failed: wrong key, context or associated data");
    };
    info!(context = ?cli.context, bytes = plaintext.len(), "Payload decrypted");

    let mut stdout = io::stdout().lock();
    stdout.write_all(&plaintext)?;
    stdout.flush()?;
    Ok(())
}

fn cmd_public_key(cli: &Cli) -> Result<()> {
    let natrium = build_natrium(cli)?;
    let context = cli.context.as_deref();

    println!(
        "Encryption key: {}",
        natrium.public_encryption_key(context)?.export()
    );
    println!(
        "Signature key:  {}",
        natrium.public_signature_key(context)?.export()
    );
    println!("Key ID:         {}", natrium.key_id(context)?.to_hex());
    Ok(())
}

fn cmd_token_issue(cli: &Cli, args: &ClaimArgs) -> Result<()> {
    let natrium = build_natrium(cli)?;
    let token = natrium.encrypt_paseto(
        &build_claims(args)?,
        build_footer(args).as_ref(),
        cli.context.as_deref(),
    )?;
    info!(context = ?cli.context, ttl = args.ttl, "Local token issued");
    println!("{}", token);
    Ok(())
}

fn cmd_token_open(cli: &Cli, token: &str, rules: &RuleArgs) -> Result<()> {
    let natrium = build_natrium(cli)?;
    let message = natrium
        .decrypt_paseto(token, cli.context.as_deref())
        .context("Failed to open token")?;
    print_message(&natrium, &message, rules)
}

fn cmd_token_sign(cli: &Cli, args: &ClaimArgs) -> Result<()> {
    let natrium = build_natrium(cli)?;
    let token = natrium.sign_paseto(
        &build_claims(args)?,
        build_footer(args).as_ref(),
        cli.context.as_deref(),
    )?;
    info!(context = ?cli.context, ttl = args.ttl, "Public token signed");
    println!("{}", token);
    Ok(())
}

fn cmd_token_verify(
    cli: &Cli,
    token: &str,
    public_key: Option<&str>,
    rules: &RuleArgs,
) -> Result<()> {
    let natrium = build_natrium(cli)?;

    let message = match public_key {
        Some(encoded) => {
            let public_key = SignaturePublicKey::import(encoded).context("Invalid public key")?;
            natrium.verify_paseto_with(token, &public_key)
        },
        None => natrium.verify_paseto(token),
    }
    .context("Failed to verify token")?;

    print_message(&natrium, &message, rules)
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Keygen => cmd_keygen(),
        Commands::Encrypt { plaintext, ad } => cmd_encrypt(&cli, plaintext.as_deref(), ad),
        Commands::Decrypt { envelope, ad } => cmd_decrypt(&cli, envelope, ad),
        Commands::PublicKey => cmd_public_key(&cli),
        Commands::Token { command } => match command {
            TokenCommands::Issue(args) => cmd_token_issue(&cli, args),
            TokenCommands::Open { token, rules } => cmd_token_open(&cli, token, rules),
            TokenCommands::Sign(args) => cmd_token_sign(&cli, args),
            TokenCommands::Verify {
                token,
                public_key,
                rules,
            } => cmd_token_verify(&cli, token, public_key.as_deref(), rules),
        },
    }
}
