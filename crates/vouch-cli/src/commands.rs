use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;
use tracing::debug;
use vouch_crypto::{KeyLocations, KeyManager, RecordSigner, VerifyingKey, DEFAULT_KEY_DIR};
use vouch_server::{InMemoryUserStore, ServerConfig, UserService, VouchServer};
use vouch_types::{parse_email, NewUser};
use vouch_verify::{trusted_set, trusted_set_concurrent, RecordVerifier, TrustedSet};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Keys(args) => match args.action {
            KeysAction::Init(dir) => cmd_keys_init(&key_dir(&dir), format),
            KeysAction::Show(dir) => cmd_keys_show(&key_dir(&dir), format),
        },
        Command::Seal(args) => cmd_seal(args, format),
        Command::Verify(args) => cmd_verify(args, format).await,
        Command::Export(args) => cmd_export(args, format),
        Command::Serve(args) => cmd_serve(args).await,
    }
}

fn key_dir(arg: &KeyDirArg) -> PathBuf {
    arg.key_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_DIR))
}

fn print_json(value: serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_keys_init(dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let keys = KeyManager::open(dir).with_context(|| format!("initializing keys in {}", dir.display()))?;
    let fingerprint = keys.verifying_key()?.fingerprint();
    let locations = keys.locations();
    match format {
        OutputFormat::Json => print_json(json!({
            "dir": locations.dir,
            "private_key": locations.private_key,
            "public_key": locations.public_key,
            "fingerprint": fingerprint,
        })),
        OutputFormat::Text => {
            println!("{} Key pair ready in {}", "✓".green().bold(), locations.dir.display().to_string().bold());
            println!("  Private: {}", locations.private_key.display());
            println!("  Public:  {}", locations.public_key.display());
            println!("  Fingerprint: {}", fingerprint.cyan());
            Ok(())
        }
    }
}

fn cmd_keys_show(dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let locations = KeyLocations::new(dir);
    if !locations.public_key.exists() {
        bail!("no public key at {}; run `vouch keys init` first", locations.public_key.display());
    }
    let pem = std::fs::read_to_string(&locations.public_key)
        .with_context(|| format!("reading {}", locations.public_key.display()))?;
    let key = VerifyingKey::from_pem(&pem)
        .with_context(|| format!("parsing {}", locations.public_key.display()))?;
    match format {
        OutputFormat::Json => print_json(json!({
            "public_key": pem,
            "fingerprint": key.fingerprint(),
        })),
        OutputFormat::Text => {
            print!("{pem}");
            println!("Fingerprint: {}", key.fingerprint().cyan());
            Ok(())
        }
    }
}

fn cmd_seal(args: SealArgs, format: OutputFormat) -> anyhow::Result<()> {
    let email = parse_email(&args.email)?;
    let dir = key_dir(&args.keys);
    let keys = KeyManager::open(&dir).with_context(|| format!("initializing keys in {}", dir.display()))?;
    let seal = RecordSigner::new(Arc::new(keys)).seal(&email)?;
    match format {
        OutputFormat::Json => print_json(json!({
            "email": seal.email(),
            "emailHash": seal.email_hash(),
            "signature": seal.signature(),
        })),
        OutputFormat::Text => {
            println!("{} Sealed {}", "✓".green().bold(), seal.email().bold());
            println!("  Hash:      {}", seal.email_hash().dimmed());
            println!("  Signature: {}", seal.signature().yellow());
            Ok(())
        }
    }
}

async fn cmd_verify(args: VerifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.batch).with_context(|| format!("reading {}", args.batch.display()))?;
    let pem = std::fs::read_to_string(&args.public_key)
        .with_context(|| format!("reading {}", args.public_key.display()))?;
    RecordVerifier::try_from_pem(&pem)
        .with_context(|| format!("public key in {}", args.public_key.display()))?;

    let set = match args.workers {
        Some(workers) => trusted_set_concurrent(bytes, &pem, workers).await?,
        None => trusted_set(bytes, &pem)?,
    };
    report(&set, format)
}

fn report(set: &TrustedSet, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(json!({
            "total": set.total(),
            "trusted": set.records(),
            "rejected": set
                .rejected()
                .iter()
                .map(|r| json!({ "index": r.index, "id": r.id, "reason": r.reason.to_string() }))
                .collect::<Vec<_>>(),
        })),
        OutputFormat::Text => {
            let summary = format!("{} of {} records trusted", set.len(), set.total());
            if set.rejected().is_empty() {
                println!("{} {}", "✓".green().bold(), summary);
            } else {
                println!("{} {}", "!".yellow().bold(), summary);
            }
            for record in set {
                println!("  {} {} {}", "✓".green(), record.id.to_string().dimmed(), record.email());
            }
            for rejection in set.rejected() {
                println!(
                    "  {} {} record #{}: {}",
                    "✗".red(),
                    rejection.id.as_str().dimmed(),
                    rejection.index,
                    rejection.reason
                );
            }
            Ok(())
        }
    }
}

fn sample_emails(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("user{i}@example.com")).collect()
}

/// Seal `emails` as new users and encode them as one batch.
fn build_batch(keys: Arc<KeyManager>, emails: &[String]) -> anyhow::Result<(Vec<u8>, usize)> {
    let service = UserService::new(Arc::new(InMemoryUserStore::new()), RecordSigner::new(keys));
    for email in emails {
        service
            .create(&NewUser::new(email.as_str()))
            .with_context(|| format!("creating {email}"))?;
    }
    Ok((service.export()?, emails.len()))
}

fn cmd_export(args: ExportArgs, format: OutputFormat) -> anyhow::Result<()> {
    let dir = key_dir(&args.keys);
    let keys = Arc::new(KeyManager::open(&dir).with_context(|| format!("initializing keys in {}", dir.display()))?);
    let emails = if args.emails.is_empty() { sample_emails(args.count) } else { args.emails };
    let (bytes, count) = build_batch(keys, &emails)?;
    std::fs::write(&args.out, &bytes).with_context(|| format!("writing {}", args.out.display()))?;
    match format {
        OutputFormat::Json => print_json(json!({
            "out": args.out,
            "records": count,
            "bytes": bytes.len(),
        })),
        OutputFormat::Text => {
            println!(
                "{} Exported {} records ({} bytes) to {}",
                "✓".green().bold(),
                count,
                bytes.len(),
                args.out.display().to_string().bold()
            );
            Ok(())
        }
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    let mut config = config.apply_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = args.keys.key_dir {
        config.key_dir = dir;
    }
    debug!(?config, "resolved server config");
    println!("vouch server on {} (keys: {})", config.bind_addr.to_string().bold(), config.key_dir.display());
    VouchServer::new(config)?.serve().await?;
    Ok(())
}
