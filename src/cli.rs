//! Command-line argument grammar
//!
//! The grammar predates this implementation and is kept compatible: bare
//! integers fill the width then height slots, a lone `-` skips the next
//! slot, and flags accept `-`, `--`, or `/` prefixes. Anchor names work as
//! flags or bare words (`termfit 130 40 center`). It cannot be expressed in
//! a declarative parser, so the tokens are scanned by hand.

use thiserror::Error;

use crate::constants::info;
use crate::placement::Anchor;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("unknown argument '{0}'.")]
    UnknownFlag(String),
    #[error("unknown argument value '{0}'.")]
    UnexpectedValue(String),
}

impl CliError {
    /// Process exit code the error maps to
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UnknownFlag(_) => 1,
            CliError::UnexpectedValue(_) => 2,
        }
    }
}

/// Informational shortcut pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoPage {
    Email,
    Website,
    Source,
    License,
}

impl InfoPage {
    pub fn url(self) -> &'static str {
        match self {
            InfoPage::Email => info::EMAIL,
            InfoPage::Website => info::WEBSITE,
            InfoPage::Source => info::SOURCE,
            InfoPage::License => info::LICENSE,
        }
    }
}

/// Everything the argument list asked for
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliRequest {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub anchor: Option<Anchor>,
    pub skip_width: bool,
    pub skip_height: bool,
    pub skip_anchor: bool,
    pub write_config: bool,
    pub clear: bool,
    pub debug: bool,
    pub show_help: bool,
    pub info: Option<InfoPage>,
}

pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<CliRequest, CliError> {
    let mut request = CliRequest::default();

    for arg in args {
        let arg = arg.as_ref().trim();
        if arg.is_empty() {
            continue;
        }

        if let Ok(value) = arg.parse::<i32>() {
            if request.width.is_none() && !request.skip_width {
                request.width = Some(value);
            } else if request.height.is_none() && !request.skip_height {
                request.height = Some(value);
            } else {
                return Err(CliError::UnexpectedValue(arg.to_string()));
            }
            continue;
        }

        if arg == "-" {
            // skip the next open positional slot: width, height, then anchor
            if request.width.is_none() && !request.skip_width {
                request.skip_width = true;
            } else if request.height.is_none() && !request.skip_height {
                request.skip_height = true;
            } else {
                request.skip_anchor = true;
            }
            continue;
        }

        let flag = arg.trim_start_matches(['-', '/']).to_ascii_lowercase();
        match flag.as_str() {
            "?" => request.show_help = true,
            "debug" => request.debug = true,
            "clear" => request.clear = true,
            "config" => request.write_config = true,
            "!config" => request.write_config = false,
            "center" => request.anchor = Some(Anchor::Center),
            "left" => request.anchor = Some(Anchor::Left),
            "right" => request.anchor = Some(Anchor::Right),
            "top" => request.anchor = Some(Anchor::Top),
            "bottom" => request.anchor = Some(Anchor::Bottom),
            "top-left" | "topleft" => request.anchor = Some(Anchor::TopLeft),
            "top-right" | "topright" => request.anchor = Some(Anchor::TopRight),
            "bottom-left" | "bottomleft" => request.anchor = Some(Anchor::BottomLeft),
            "bottom-right" | "bottomright" => request.anchor = Some(Anchor::BottomRight),
            "maximized" | "max" => request.anchor = Some(Anchor::Maximized),
            "minimized" | "min" => request.anchor = Some(Anchor::Minimized),
            "restore" => request.anchor = Some(Anchor::Restore),
            other => {
                // the informational flags match on their first letter, the
                // way the original shortcuts always have
                if other.starts_with('h') {
                    request.show_help = true;
                } else if other.starts_with('e') {
                    request.info = Some(InfoPage::Email);
                } else if other.starts_with('w') {
                    request.info = Some(InfoPage::Website);
                } else if other.starts_with('s') {
                    request.info = Some(InfoPage::Source);
                } else if other.starts_with('l') {
                    request.info = Some(InfoPage::License);
                } else {
                    return Err(CliError::UnknownFlag(arg.to_string()));
                }
            }
        }
    }

    Ok(request)
}

pub fn print_usage() {
    println!("\nUSAGE:");
    println!("  termfit [--config][--clear] width height anchor");
    println!();
    println!("    width      sets the width of the terminal window, in columns.");
    println!("    height     sets the height of the terminal window, in rows.");
    println!("    anchor     places the window: center, left, right, top, bottom,");
    println!("               top-left, top-right, bottom-left, bottom-right, maximized.");
    println!();
    println!("    if a value is not specified the saved config value is used. use -");
    println!("    in place of a value to keep the current one regardless of config.");
    println!();
    println!("    --clear    clears the values saved in config.");
    println!("    --config   when used with other arguments, those values are applied");
    println!("               then saved to config. when used alone, only displays the");
    println!("               saved values.");
    println!("    --debug    waits for enter after applying, so the window can be");
    println!("               inspected before the prompt redraws.");
    println!();
    println!("EXAMPLES:");
    println!("  termfit --config             displays all config values.");
    println!("  termfit 130 40 center        sets the size, then centers the window.");
    println!("  termfit - 40 center          sets the height and centers the window.");
    println!("  termfit 130                  sets the width.");
    println!("  termfit - - center           centers the window at its current size.");
    println!("  termfit top-right            half-width, half-height window in the");
    println!("                               top right corner of the working area.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_width_then_height() {
        let request = parse(&["130", "40"]).unwrap();
        assert_eq!(request.width, Some(130));
        assert_eq!(request.height, Some(40));
        assert_eq!(request.anchor, None);
    }

    #[test]
    fn test_negative_number_is_positional() {
        let request = parse(&["-5"]).unwrap();
        assert_eq!(request.width, Some(-5));
    }

    #[test]
    fn test_sentinel_skips_width_slot() {
        let request = parse(&["-", "60"]).unwrap();
        assert!(request.skip_width);
        assert_eq!(request.width, None);
        assert_eq!(request.height, Some(60));
    }

    #[test]
    fn test_sentinel_skips_all_three_slots() {
        let request = parse(&["-", "-", "-"]).unwrap();
        assert!(request.skip_width);
        assert!(request.skip_height);
        assert!(request.skip_anchor);
    }

    #[test]
    fn test_bare_center_word_sets_anchor() {
        let request = parse(&["130", "40", "center"]).unwrap();
        assert_eq!(request.anchor, Some(Anchor::Center));
    }

    #[test]
    fn test_anchor_flags() {
        assert_eq!(parse(&["--top-left"]).unwrap().anchor, Some(Anchor::TopLeft));
        assert_eq!(parse(&["bottomright"]).unwrap().anchor, Some(Anchor::BottomRight));
        assert_eq!(parse(&["--max"]).unwrap().anchor, Some(Anchor::Maximized));
        assert_eq!(parse(&["restore"]).unwrap().anchor, Some(Anchor::Restore));
    }

    #[test]
    fn test_left_is_an_anchor_not_the_license_shortcut() {
        let request = parse(&["--left"]).unwrap();
        assert_eq!(request.anchor, Some(Anchor::Left));
        assert_eq!(request.info, None);
    }

    #[test]
    fn test_flag_prefixes_are_interchangeable() {
        for form in ["--config", "-config", "/config", "CONFIG"] {
            assert!(parse(&[form]).unwrap().write_config, "form {form}");
        }
    }

    #[test]
    fn test_not_config_overrides_config() {
        let request = parse(&["--config", "--!config"]).unwrap();
        assert!(!request.write_config);
    }

    #[test]
    fn test_help_matches_question_mark_and_h_prefix() {
        assert!(parse(&["/?"]).unwrap().show_help);
        assert!(parse(&["-h"]).unwrap().show_help);
        assert!(parse(&["--help"]).unwrap().show_help);
    }

    #[test]
    fn test_info_shortcuts_match_on_prefix() {
        assert_eq!(parse(&["--email"]).unwrap().info, Some(InfoPage::Email));
        assert_eq!(parse(&["-w"]).unwrap().info, Some(InfoPage::Website));
        assert_eq!(parse(&["--src"]).unwrap().info, Some(InfoPage::Source));
        assert_eq!(parse(&["--lic"]).unwrap().info, Some(InfoPage::License));
    }

    #[test]
    fn test_unknown_flag_is_exit_code_one() {
        let err = parse(&["--bogus"]).unwrap_err();
        assert_eq!(err, CliError::UnknownFlag("--bogus".to_string()));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_extra_positional_is_exit_code_two() {
        let err = parse(&["10", "20", "30"]).unwrap_err();
        assert_eq!(err, CliError::UnexpectedValue("30".to_string()));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_tokens_are_trimmed() {
        let request = parse(&[" 130 ", " center "]).unwrap();
        assert_eq!(request.width, Some(130));
        assert_eq!(request.anchor, Some(Anchor::Center));
    }
}
