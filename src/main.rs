use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use portfolio_pdf::contact::{
    ContactSubmission, EmailConfig, EmailJsTransport, SendOptions, send_contact_email,
};
use portfolio_pdf::{
    BASE_PATH_ENV, DEFAULT_BASE_PATH, DEFAULT_CONFIG_PATH, FontSources, GenerateOptions, SiteFetcher,
    generate_to_dir,
};

#[derive(Parser)]
#[command(
    name = "portfolio-pdf",
    about = "Lay out an artist site's content model as a PDF portfolio",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the portfolio PDF
    Generate {
        /// Deployment base path: a site URL or a local export directory
        #[arg(short, long, env = BASE_PATH_ENV, default_value = DEFAULT_BASE_PATH)]
        base: String,

        /// Configuration document, relative to the base path
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,

        /// Directory the PDF is written into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Draw link labels without clickable annotations
        #[arg(long)]
        no_links: bool,

        /// Generation date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// TrueType/OpenType file for regular text
        #[arg(long)]
        font: Option<PathBuf>,

        /// TrueType/OpenType file for bold text
        #[arg(long)]
        bold_font: Option<PathBuf>,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 15)]
        timeout: u64,
    },

    /// Send a contact-form message through EmailJS
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        /// Message body
        #[arg(long)]
        purpose: String,

        /// Extra attempts after the first
        #[arg(long, default_value_t = 2)]
        retries: u32,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            base,
            config,
            output,
            no_links,
            date,
            font,
            bold_font,
            timeout,
        } => {
            let mut options = GenerateOptions {
                base_path: base,
                config_path: config,
                include_links: !no_links,
                fonts: FontSources {
                    regular: font,
                    bold: bold_font,
                },
                ..GenerateOptions::default()
            };
            if let Some(date) = date {
                options.date = date;
            }
            let fetcher = SiteFetcher::with_timeout(std::time::Duration::from_secs(timeout));

            let mut report = |percent: u8| {
                eprint!("\rGenerating portfolio... {percent:>3}%");
                let _ = std::io::stderr().flush();
            };
            let result = generate_to_dir(&fetcher, &options, &output, Some(&mut report));
            eprintln!();
            match result {
                Ok((path, portfolio)) => {
                    println!(
                        "{} ({} pages, {} images)",
                        path.display(),
                        portfolio.page_count(),
                        portfolio.image_count()
                    );
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Contact {
            name,
            email,
            phone,
            purpose,
            retries,
        } => {
            let submission = ContactSubmission {
                name,
                email,
                phone,
                purpose,
                timestamp: Some(chrono::Local::now()),
            };
            let options = SendOptions {
                retries,
                ..SendOptions::default()
            };
            match send_contact_email(
                &EmailJsTransport::new(),
                &EmailConfig::from_env(),
                &submission,
                &options,
            ) {
                Ok(()) => {
                    println!("Message sent");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error [{}]: {e}", e.kind.code());
                    ExitCode::FAILURE
                }
            }
        }
    }
}
