use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a video through the whole pipeline
    Run {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Target language code (see `languages`)
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Export the translated text into this directory when done
        #[arg(short, long)]
        export_dir: Option<PathBuf>,

        /// Save the finished pipeline as a project with this name
        #[arg(long)]
        save: Option<String>,

        /// Original soundtrack volume, 0-100
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        original_volume: Option<u8>,

        /// Translated voice volume, 0-100
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        translated_volume: Option<u8>,

        /// Start playback of the mix once it is ready
        #[arg(long)]
        play: bool,
    },

    /// List supported target languages
    Languages,

    /// Translate text with the configured provider
    Translate {
        /// Text to translate
        #[arg(long)]
        text: String,

        /// Target language code
        #[arg(short, long)]
        target_lang: String,
    },

    /// Synthesize placeholder voice bytes for text
    Synthesize {
        /// Text to synthesize
        #[arg(long)]
        text: String,

        /// Target language code
        #[arg(short, long, default_value = "es")]
        target_lang: String,

        /// Output file for the synthesized bytes
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Manage saved projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Serve the placeholder translation endpoint
    Serve {
        /// Address to bind (defaults to the configured one)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output file
        #[arg(short, long, default_value = "redub.toml")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects saved in local storage
    List,

    /// Print a saved project as JSON
    Show {
        /// Project name
        name: String,
    },

    /// Load a project file and continue the pipeline from it
    Load {
        /// Project JSON file
        file: PathBuf,

        /// Export the translated text into this directory
        #[arg(short, long)]
        export_dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let args = Args::parse_from([
            "redub", "-v", "run", "-i", "movie.mp4", "-t", "fr", "--save", "demo",
            "--original-volume", "20",
        ]);
        assert!(args.verbose);
        match args.command {
            Commands::Run {
                input,
                target_lang,
                save,
                export_dir,
                original_volume,
                translated_volume,
                play,
            } => {
                assert_eq!(input, PathBuf::from("movie.mp4"));
                assert_eq!(target_lang.as_deref(), Some("fr"));
                assert_eq!(save.as_deref(), Some("demo"));
                assert!(export_dir.is_none());
                assert_eq!(original_volume, Some(20));
                assert_eq!(translated_volume, None);
                assert!(!play);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_project_load() {
        let args = Args::parse_from(["redub", "project", "load", "demo.json", "-e", "out"]);
        match args.command {
            Commands::Project { action: ProjectAction::Load { file, export_dir } } => {
                assert_eq!(file, PathBuf::from("demo.json"));
                assert_eq!(export_dir, Some(PathBuf::from("out")));
            }
            _ => panic!("expected project load"),
        }
    }

    #[test]
    fn test_volume_out_of_range_is_rejected() {
        let result = Args::try_parse_from([
            "redub", "run", "-i", "movie.mp4", "--translated-volume", "150",
        ]);
        assert!(result.is_err());
    }
}
