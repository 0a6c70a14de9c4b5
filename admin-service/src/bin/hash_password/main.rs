//! Offline helper that hashes an admin password for the credentials file.
//!
//! ```text
//! hash-password 'correct horse' --username admin > user.json
//! ```

use auth::PasswordHasher;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "hash-password", version, about = "Hash an admin password with Argon2id")]
struct Args {
    /// Plaintext password to hash
    password: String,

    /// Print a complete credentials record for this username instead of the bare hash
    #[arg(long)]
    username: Option<String>,

    /// Argon2 memory cost in KiB
    #[arg(long, default_value_t = 19456)]
    memory_kib: u32,

    /// Argon2 iteration count
    #[arg(long, default_value_t = 2)]
    iterations: u32,

    /// Argon2 degree of parallelism
    #[arg(long, default_value_t = 1)]
    parallelism: u32,
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    if args.password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    let hasher = PasswordHasher::with_params(args.memory_kib, args.iterations, args.parallelism)?;
    let hash = hasher.hash(&args.password)?;

    match args.username {
        Some(username) => {
            let record = serde_json::json!({
                "username": username,
                "passwordHash": hash,
            });
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        None => println!("{}", hash),
    }

    Ok(())
}
