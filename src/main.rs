//! hanzi-vault - Encrypted Chinese character statistics
//!
//! Usage:
//!   hanzi-vault encrypt --input-dir <dir> --output-dir <dir>  - Encrypt plaintext datasets
//!   hanzi-vault summary                                       - Show summary statistics
//!   hanzi-vault freq                                          - Show the frequency table
//!   hanzi-vault rank                                          - Rank characters by cohesion
//!   hanzi-vault cohesion <char>                               - Show cohesion of a character
//!   hanzi-vault search <char>                                 - Find a character in the text
//!   hanzi-vault select <chars>...                             - Check characters

use clap::{Parser, Subcommand};
use hanzi_vault::{
    config::Config,
    crypto::{encrypt, Decryptor, Pbkdf2Deriver},
    session::{Selection, SelectionStore, Session, TOP_COHESIVE_CHARS},
    store::{DirStore, Resource},
    Error, Result,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "hanzi-vault")]
#[command(author = "hanzi-vault Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Decrypt and explore encrypted Chinese character statistics")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "~/.config/hanzi-vault/config.json")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding the encrypted data files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read the password from a file instead of prompting
    #[arg(long, global = true)]
    password_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt plaintext dataset files into the data directory format
    Encrypt {
        /// Directory with char_freq.json, char_cohesion.json, ... and test.txt
        #[arg(long)]
        input_dir: PathBuf,

        /// Directory to write the .enc files to
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// Show summary statistics
    Summary,

    /// Show the character frequency table
    Freq {
        /// Number of rows to show
        #[arg(long, default_value_t = 20)]
        top: usize,

        /// Only show characters containing this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Rank characters by total cohesion
    Rank {
        /// Number of rows to show
        #[arg(long, default_value_t = TOP_COHESIVE_CHARS)]
        top: usize,
    },

    /// Show left and right cohesion of a character
    Cohesion {
        /// Center character
        char: String,
    },

    /// Find every occurrence of a character in the text
    Search {
        /// Character to find
        char: String,
    },

    /// Show the network of the active characters
    Network,

    /// Show the filtered transcript
    Transcript {
        /// Maximum number of lines to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Check characters
    Select {
        /// Characters to check
        chars: Vec<String>,

        /// Check every character
        #[arg(long)]
        all: bool,
    },

    /// Uncheck characters
    Unselect {
        /// Characters to uncheck
        chars: Vec<String>,

        /// Uncheck every character
        #[arg(long)]
        all: bool,
    },

    /// Show the saved selection
    Selection,
}

fn main() {
    let cli = Cli::parse();

    // Expand ~ in config path
    let config_path = expand_tilde(&cli.config);

    let mut config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(dir) = &cli.data_dir {
        config.data.base_dir = dir.clone();
    }

    // Setup logging
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    // Run the command
    if let Err(e) = run_command(cli.command, &config, cli.password_file.as_deref()) {
        error!("Error: {}", e);
        eprintln!("{}", failure_message(&e));
        std::process::exit(1);
    }
}

/// What goes to stderr, whatever the log filter says
fn failure_message(e: &Error) -> String {
    match e {
        Error::LoginFailed => Error::user_message().to_string(),
        other => format!("Error: {}", other),
    }
}

fn run_command(command: Commands, config: &Config, password_file: Option<&Path>) -> Result<()> {
    match command {
        Commands::Encrypt {
            input_dir,
            output_dir,
        } => cmd_encrypt(config, &input_dir, &output_dir, password_file),

        Commands::Summary => cmd_summary(config, password_file),

        Commands::Freq { top, filter } => {
            cmd_freq(config, password_file, top, filter.as_deref())
        }

        Commands::Rank { top } => cmd_rank(config, password_file, top),

        Commands::Cohesion { char } => cmd_cohesion(config, password_file, &char),

        Commands::Search { char } => cmd_search(config, password_file, &char),

        Commands::Network => cmd_network(config, password_file),

        Commands::Transcript { limit } => cmd_transcript(config, password_file, limit),

        Commands::Select { chars, all } => {
            cmd_set_selection(config, password_file, &chars, all, true)
        }

        Commands::Unselect { chars, all } => {
            cmd_set_selection(config, password_file, &chars, all, false)
        }

        Commands::Selection => cmd_selection(config),
    }
}

fn read_password(password_file: Option<&Path>) -> Result<Zeroizing<String>> {
    let raw = Zeroizing::new(if let Some(path) = password_file {
        std::fs::read_to_string(path)
            .map_err(|e| Error::Internal(format!("Failed to read password file: {}", e)))?
    } else {
        rpassword::prompt_password("Enter password: ")
            .map_err(|e| Error::Internal(e.to_string()))?
    });

    Ok(Zeroizing::new(raw.trim().to_string()))
}

/// Decrypt every resource. The specific failure is only logged at debug
/// level; the caller gets `Error::LoginFailed`.
fn login(config: &Config, password_file: Option<&Path>) -> Result<Session> {
    let password = read_password(password_file)?;
    let store = DirStore::new(&config.data.base_dir);
    let decryptor = Decryptor::with_iterations(config.kdf.iterations);

    info!("Loading data from {:?}", store.base_dir());

    let runtime = tokio::runtime::Runtime::new().map_err(|e| Error::Internal(e.to_string()))?;
    runtime
        .block_on(Session::login(&store, &decryptor, &password))
        .map_err(|e| {
            debug!("Login failed ({}): {}", e.kind(), e);
            Error::LoginFailed
        })
}

fn load_selection(config: &Config, session: &Session) -> Result<(SelectionStore, Selection)> {
    if let Some(parent) = config.selection.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = SelectionStore::open(&config.selection.db_path)?;

    let mut selection = Selection::from_table(session.char_freq());
    selection.apply_saved(&store.load(&config.selection.key)?);

    Ok((store, selection))
}

fn single_char(s: &str) -> Result<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::Internal(format!("Expected a single character, got {:?}", s))),
    }
}

fn cmd_encrypt(
    config: &Config,
    input_dir: &Path,
    output_dir: &Path,
    password_file: Option<&Path>,
) -> Result<()> {
    let password = read_password(password_file)?;
    if password.is_empty() {
        return Err(Error::InvalidConfig("Password must not be empty".to_string()));
    }

    std::fs::create_dir_all(output_dir)?;
    let deriver = Pbkdf2Deriver::new(config.kdf.iterations);

    let mut written = 0;
    for resource in Resource::ALL {
        let in_path = input_dir.join(resource.source_file());
        if !in_path.exists() {
            warn!("Skipping {:?}: file does not exist", in_path);
            continue;
        }

        let plaintext = std::fs::read(&in_path)?;
        let payload = encrypt(&plaintext, &password, &deriver)?;

        let out_path = output_dir.join(resource.locator());
        std::fs::write(&out_path, payload.to_base64())?;
        info!("Encrypted {:?} -> {:?}", in_path, out_path);
        written += 1;
    }

    println!("Encrypted {} of {} files into {:?}", written, Resource::ALL.len(), output_dir);
    Ok(())
}

fn cmd_summary(config: &Config, password_file: Option<&Path>) -> Result<()> {
    let session = login(config, password_file)?;

    println!("Summary");
    println!("=======");
    println!();

    let Some(overview) = session.overview() else {
        println!("No summary data");
        return Ok(());
    };

    println!("Characters:         {}", overview.total_chars);
    println!("Total cohesion:     {}", overview.total_cohesion);
    println!("Average cohesion:   {:.2}", overview.average_cohesion);
    match &overview.top_frequency {
        Some(r) => println!("Most frequent:      {} ({})", r.char, r.freq),
        None => println!("Most frequent:      - (0)"),
    }
    match &overview.top_cohesion {
        Some(r) => println!("Most cohesive:      {} ({})", r.char, r.total_cohesion),
        None => println!("Most cohesive:      - (0)"),
    }
    println!("Transcript lines:   {}", session.transcript().len());

    Ok(())
}

fn cmd_freq(
    config: &Config,
    password_file: Option<&Path>,
    top: usize,
    filter: Option<&str>,
) -> Result<()> {
    let session = login(config, password_file)?;
    let (_, selection) = load_selection(config, &session)?;

    let rows: Vec<_> = match filter {
        Some(query) => session.search_freq(query),
        None => session.char_freq().iter().collect(),
    };
    if rows.is_empty() {
        println!("No matching characters");
        return Ok(());
    }

    println!("{:>5}  {:<4} {:>8}  {}", "rank", "char", "freq", "checked");
    for (idx, record) in rows.into_iter().take(top).enumerate() {
        let mark = if selection.is_checked(&record.char) { "x" } else { "" };
        println!("{:>5}  {:<4} {:>8}  {}", idx + 1, record.char, record.freq, mark);
    }

    Ok(())
}

fn cmd_rank(config: &Config, password_file: Option<&Path>, top: usize) -> Result<()> {
    let session = login(config, password_file)?;
    let ranked = session.top_cohesive(top);
    if ranked.is_empty() {
        println!("No summary data");
        return Ok(());
    }

    println!("{:>5}  {:<4} {:>8} {:>8} {:>8}", "rank", "char", "left", "right", "total");
    for (idx, record) in ranked.into_iter().enumerate() {
        println!(
            "{:>5}  {:<4} {:>8} {:>8} {:>8}",
            idx + 1,
            record.char,
            record.left_cohesion_count,
            record.right_cohesion_count,
            record.total_cohesion
        );
    }

    Ok(())
}

fn cmd_cohesion(config: &Config, password_file: Option<&Path>, center: &str) -> Result<()> {
    let session = login(config, password_file)?;
    let records = session.cohesion_for(center);

    println!("Cohesion for {}", center);
    if let Some(summary) = session.summary_of(center) {
        println!(
            "left: {}  right: {}  total: {}",
            summary.left_cohesion_count, summary.right_cohesion_count, summary.total_cohesion
        );
    }
    println!();

    if records.is_empty() {
        println!("No cohesion data");
        return Ok(());
    }

    println!("{:<4} {:<6} {:>8}", "char", "side", "count");
    for record in records {
        println!(
            "{:<4} {:<6} {:>8}",
            record.neighbor_char, record.direction, record.cohesion_count
        );
    }

    Ok(())
}

fn cmd_search(config: &Config, password_file: Option<&Path>, target: &str) -> Result<()> {
    let ch = single_char(target)?;
    let session = login(config, password_file)?;
    let found = session.occurrences(ch);

    match session.frequency_of(target) {
        Some(record) => println!("{}: freq {}, {} occurrences", ch, record.freq, found.len()),
        None => println!("{}: {} occurrences", ch, found.len()),
    }

    for occurrence in found {
        println!("  line {}, position {}", occurrence.line_number, occurrence.index);
    }

    Ok(())
}

fn cmd_network(config: &Config, password_file: Option<&Path>) -> Result<()> {
    let session = login(config, password_file)?;
    let (_, selection) = load_selection(config, &session)?;
    let graph = session.network_for(&selection);

    println!("Nodes ({})", graph.nodes.len());
    for node in &graph.nodes {
        println!("  {} {}", node.id, node.value);
    }

    println!("Links ({})", graph.links.len());
    for link in &graph.links {
        println!("  {} -> {} {}", link.source, link.target, link.value);
    }

    Ok(())
}

fn cmd_transcript(config: &Config, password_file: Option<&Path>, limit: Option<usize>) -> Result<()> {
    let session = login(config, password_file)?;
    let lines = session.transcript();

    for line in lines.iter().take(limit.unwrap_or(lines.len())) {
        println!("{:>6}  {}", line.line_number, line.text);
    }

    Ok(())
}

fn cmd_set_selection(
    config: &Config,
    password_file: Option<&Path>,
    chars: &[String],
    all: bool,
    checked: bool,
) -> Result<()> {
    let session = login(config, password_file)?;
    let (store, mut selection) = load_selection(config, &session)?;

    if all {
        selection.set_all(checked);
    }
    for ch in chars {
        if !selection.set(ch, checked) {
            warn!("{} is not in the frequency table", ch);
        }
    }

    store.save(&config.selection.key, selection.entries())?;
    println!("{} characters checked", selection.checked_chars().len());

    Ok(())
}

fn cmd_selection(config: &Config) -> Result<()> {
    if !config.selection.db_path.exists() {
        println!("No saved selection");
        return Ok(());
    }

    let store = SelectionStore::open(&config.selection.db_path)?;
    let checked: Vec<String> = store
        .load(&config.selection.key)?
        .into_iter()
        .filter(|(_, checked)| *checked)
        .map(|(c, _)| c)
        .collect();

    if checked.is_empty() {
        println!("No characters checked");
    } else {
        println!("{}", checked.join(" "));
    }

    Ok(())
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failure_prints_only_generic_text() {
        assert_eq!(
            failure_message(&Error::LoginFailed),
            "wrong password or data load failed"
        );
        assert_eq!(
            failure_message(&Error::InvalidConfig("Password must not be empty".to_string())),
            "Error: Invalid configuration: Password must not be empty"
        );
    }

    #[test]
    fn test_password_file_trimmed() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("pw");
        std::fs::write(&path, "  正确的密码\n").unwrap();

        let password: Zeroizing<String> = read_password(Some(&path)).unwrap();
        assert_eq!(password.as_str(), "正确的密码");
    }
}
