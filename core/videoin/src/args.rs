// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about, long_about = None, disable_version_flag = true)]
pub struct Args {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", env = "CONFIG")]
    config: Option<String>,

    /// Print the build information and exit
    #[arg(short = 'V', long)]
    version: bool,
}

impl Args {
    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn version(&self) -> bool {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let args = Args::try_parse_from(["videoin", "--config", "config.yaml"]).unwrap();
        assert_eq!(args.config(), Some("config.yaml"));
        assert!(!args.version());

        let args = Args::try_parse_from(["videoin", "-c", "other.yaml"]).unwrap();
        assert_eq!(args.config(), Some("other.yaml"));
    }

    #[test]
    fn test_parse_version() {
        let args = Args::try_parse_from(["videoin", "--version"]).unwrap();
        assert!(args.version());

        let args = Args::try_parse_from(["videoin", "-V"]).unwrap();
        assert!(args.version());
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Args::try_parse_from(["videoin", "--endpoint", "0.0.0.0:1"]).is_err());
    }
}
