use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sscipher::config::CipherSettings;
use sscipher::{cipher, Direction};
use std::io::{Read, Write};
use std::path::PathBuf;

const CHUNK_SIZE: usize = 16 * 1024;

#[derive(Parser)]
struct Cli {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(clap::Args)]
struct CipherArgs {
    /// The cipher method, e.g. aes-256-cfb. Overrides the method in the config file.
    #[clap(long)]
    method: Option<String>,

    /// Path to a YAML file with `method` and `password`. Without it the password
    /// must be given as the environment variable SSCIPHER_PASSWORD.
    #[clap(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List the methods usable on this build.
    Methods {
        /// Also list registered methods that are not available.
        #[clap(long)]
        all: bool,
    },

    /// Encrypt stdin to stdout. The IV is written first.
    Encrypt {
        #[clap(flatten)]
        args: CipherArgs,
    },

    /// Decrypt stdin, as written by `encrypt`, to stdout.
    Decrypt {
        #[clap(flatten)]
        args: CipherArgs,
    },
}

fn load_settings(CipherArgs { method, config }: CipherArgs) -> anyhow::Result<CipherSettings> {
    let mut settings = match config {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_yaml::from_str(&content).context("parsing config")?
        }
        None => CipherSettings::new(
            method.clone().context("--method is required without --config")?,
            std::env::var("SSCIPHER_PASSWORD")
                .context("Password must be given via env SSCIPHER_PASSWORD")?,
        ),
    };

    if let Some(method) = method {
        settings.method = method;
    }

    settings.validate()?;

    if cipher::lookup(&settings.method)?.is_aead() {
        bail!(
            "{} is an AEAD method and needs the proxy framing, use a stream method",
            settings.method
        );
    }

    Ok(settings)
}

fn pump(
    cipher: &mut sscipher::Cipher,
    mut r: impl Read,
    mut w: impl Write,
) -> anyhow::Result<usize> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0;
    loop {
        match r.read(&mut buf).context("reading input")? {
            0 => break,
            n => {
                w.write_all(&cipher.update(&buf[..n])?)
                    .context("writing output")?;
                total += n;
            }
        }
    }
    w.flush()?;
    Ok(total)
}

fn main() -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let Cli { cmd } = Cli::parse();

    match cmd {
        Command::Methods { all } => {
            let supported = cipher::supported_methods();
            for (name, info) in cipher::registry::methods() {
                let available = supported.contains(&name);
                if available || all {
                    println!(
                        "{name:<20} key={:<3} iv={:<3} {:?}{}",
                        info.key_len,
                        info.iv_len,
                        info.kind,
                        if available { "" } else { " (unavailable)" }
                    );
                }
            }
            Ok(())
        }

        Command::Encrypt { args } => {
            let settings = load_settings(args)?;
            let mut enc = settings.new_encryptor()?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(enc.iv()).context("writing iv")?;

            let n = pump(&mut enc, std::io::stdin().lock(), stdout)?;
            log::info!("Encrypted {n} bytes with {}", settings.method);
            Ok(())
        }

        Command::Decrypt { args } => {
            let settings = load_settings(args)?;
            let mut stdin = std::io::stdin().lock();

            let mut iv = vec![0u8; cipher::lookup(&settings.method)?.iv_len];
            stdin
                .read_exact(&mut iv)
                .context("reading iv, input too short")?;

            let mut dec = settings.new_cipher(&iv, Direction::Decrypt)?;
            let n = pump(&mut dec, stdin, std::io::stdout().lock())?;
            log::info!("Decrypted {n} bytes with {}", settings.method);
            Ok(())
        }
    }
}
