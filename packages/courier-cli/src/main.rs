//! Courier command-line tool
//!
//! A thin front end over `courier-core` for working with keys and payloads
//! by hand:
//!
//! 1. **Keys**: generate an RSA keypair as PEM files.
//!
//! 2. **Messages**: encrypt for a recipient's public key, decrypt with your
//!    own private key.
//!
//! 3. **Custody**: wrap / unwrap a private key with a password taken from an
//!    environment variable, never from the command line.
//!
//! 4. **Requests**: sign and verify request envelopes.
//!
//! Values that are not given as arguments are read from stdin. Results go to
//! stdout, diagnostics to stderr.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, Result, WrapErr};
use courier_core::{CodecKind, CryptoConfig, CryptoCore, RequestEnvelope, UserPassword};
use zeroize::Zeroizing;

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "courier", version, about = "Courier end-to-end encryption toolkit")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "COURIER_CONFIG")]
    config: Option<PathBuf>,

    /// Compression codec (deflate, zlib or zstd), overrides the config file
    #[arg(long, global = true, env = "COURIER_CODEC", value_parser = parse_codec)]
    codec: Option<CodecKind>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a keypair as <name>.pub.pem and <name>.pem
    Keygen {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Base file name
        #[arg(short, long, default_value = "courier")]
        name: String,
    },

    /// Encrypt a message for a recipient
    Encrypt {
        /// Recipient public key (PEM file)
        #[arg(short, long)]
        recipient: PathBuf,
        /// Message text (stdin if omitted)
        message: Option<String>,
    },

    /// Decrypt a packed message with your private key
    Decrypt {
        /// Private key (PEM file)
        #[arg(short, long)]
        key: PathBuf,
        /// Packed message (stdin if omitted)
        packed: Option<String>,
    },

    /// Wrap a private key with a password for server-side storage
    WrapKey {
        /// Private key (PEM file)
        #[arg(short, long)]
        key: PathBuf,
        /// Environment variable holding the password
        #[arg(long, default_value = "COURIER_PASSWORD")]
        password_env: String,
    },

    /// Unwrap a private key blob and print the PEM
    UnwrapKey {
        /// Wrapped key (stdin if omitted)
        blob: Option<String>,
        /// Environment variable holding the password
        #[arg(long, default_value = "COURIER_PASSWORD")]
        password_env: String,
    },

    /// Sign a request and print the envelope JSON
    SignRequest {
        /// Private key (PEM file)
        #[arg(short, long)]
        key: PathBuf,
        /// Account id
        #[arg(short, long)]
        user_id: String,
        /// Bearer token
        #[arg(short, long)]
        auth: String,
        /// Request body (stdin if omitted)
        body: Option<String>,
    },

    /// Verify a signed request envelope
    VerifyRequest {
        /// Sender public key (PEM file)
        #[arg(short, long)]
        key: PathBuf,
        /// Envelope JSON (stdin if omitted)
        envelope: Option<String>,
    },
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => CryptoConfig::load(path)
            .wrap_err_with(|| format!("loading {}", path.display()))?,
        None => CryptoConfig::default(),
    };
    if let Some(codec) = cli.codec {
        config.compression = codec;
    }
    let core = CryptoCore::new(config)?;

    run(&core, cli.command).await
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "courier=debug,courier_core=debug"
    } else {
        "courier=info,courier_core=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(io::stderr)
        .init();
}

async fn run(core: &CryptoCore, command: Command) -> Result<ExitCode> {
    match command {
        Command::Keygen { out_dir, name } => {
            let keypair = core.generate_keypair_async().await?;
            let public_path = out_dir.join(format!("{}.pub.pem", name));
            let private_path = out_dir.join(format!("{}.pem", name));

            fs::write(&public_path, keypair.public_key())
                .wrap_err_with(|| format!("writing {}", public_path.display()))?;
            write_private(&private_path, keypair.private_key())?;

            let fingerprint = keypair.fingerprint()?;
            tracing::info!(
                fingerprint = fingerprint.as_str(),
                "Wrote {} and {}",
                public_path.display(),
                private_path.display()
            );
        }

        Command::Encrypt { recipient, message } => {
            let public_key = read_file(&recipient)?;
            let message = arg_or_stdin(message)?;

            let packed = core
                .messages()
                .encrypt_message_async(message, public_key)
                .await
                .ok_or_else(|| eyre!("encryption failed"))?;
            println!("{}", packed);
        }

        Command::Decrypt { key, packed } => {
            let private_key = Zeroizing::new(read_file(&key)?);
            let packed = arg_or_stdin(packed)?;

            match core
                .messages()
                .decrypt_message_async(packed, private_key)
                .await?
            {
                Some(text) => println!("{}", text),
                None => bail!("could not decrypt message (wrong key or damaged data)"),
            }
        }

        Command::WrapKey { key, password_env } => {
            let private_key = Zeroizing::new(read_file(&key)?);
            let password = password_from_env(&password_env)?;

            let wrapped = core
                .custody()
                .wrap_private_key(&private_key, &password)
                .ok_or_else(|| eyre!("wrapping failed"))?;
            println!("{}", wrapped);
        }

        Command::UnwrapKey { blob, password_env } => {
            let blob = arg_or_stdin(blob)?;
            let password = password_from_env(&password_env)?;

            let private_key = core
                .custody()
                .unwrap_private_key(&blob, &password)
                .ok_or_else(|| eyre!("could not unwrap key (wrong password or damaged blob)"))?;
            println!("{}", private_key.as_str());
        }

        Command::SignRequest {
            key,
            user_id,
            auth,
            body,
        } => {
            let private_key = Zeroizing::new(read_file(&key)?);
            let body = arg_or_stdin(body)?;

            let envelope = RequestEnvelope::new(user_id, auth, body).sign(&private_key);
            if !envelope.is_signed() {
                bail!("could not sign request with {}", key.display());
            }
            println!("{}", envelope.to_json()?);
        }

        Command::VerifyRequest { key, envelope } => {
            let public_key = read_file(&key)?;
            let envelope = RequestEnvelope::from_json(&arg_or_stdin(envelope)?)?;

            if envelope.verify(&public_key) {
                println!("valid");
            } else {
                println!("invalid");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_codec(name: &str) -> std::result::Result<CodecKind, String> {
    name.parse().map_err(|e: courier_core::Error| e.to_string())
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))
}

fn arg_or_stdin(value: Option<String>) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .wrap_err("reading stdin")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn password_from_env(var: &str) -> Result<UserPassword> {
    let password =
        std::env::var(var).map_err(|_| eyre!("environment variable {} is not set", var))?;
    if password.is_empty() {
        bail!("environment variable {} is empty", var);
    }
    Ok(UserPassword::new(password))
}

fn write_private(path: &Path, pem: &str) -> Result<()> {
    fs::write(path, pem).wrap_err_with(|| format!("writing {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .wrap_err_with(|| format!("restricting permissions on {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_encrypt() {
        let cli =
            Cli::try_parse_from(["courier", "encrypt", "-r", "bob.pub.pem", "hello"]).unwrap();

        match cli.command {
            Command::Encrypt { recipient, message } => {
                assert_eq!(recipient, PathBuf::from("bob.pub.pem"));
                assert_eq!(message.as_deref(), Some("hello"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_password_env_default() {
        let cli =
            Cli::try_parse_from(["courier", "--verbose", "wrap-key", "-k", "me.pem"]).unwrap();

        assert!(cli.verbose);
        match cli.command {
            Command::WrapKey { password_env, .. } => assert_eq!(password_env, "COURIER_PASSWORD"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_codec_override() {
        let cli = Cli::try_parse_from(["courier", "keygen", "--codec", "ZSTD"]).unwrap();
        assert_eq!(cli.codec, Some(CodecKind::Zstd));

        let err = Cli::try_parse_from(["courier", "keygen", "--codec", "brotli"]).unwrap_err();
        assert!(err.to_string().contains("brotli"));
    }
}
