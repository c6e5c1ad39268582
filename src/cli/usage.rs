//! cli::usage
//!
//! Help and usage rendering.
//!
//! Three pieces of text are produced, all from the declared option schema
//! and the message table:
//!
//! - a one-line synopsis: program name, an option summary, ` command [ARG ...]`
//! - the full usage block: one aligned line per option
//! - the common-commands listing: each name padded to the longest name plus
//!   two columns, followed by its usage text, in catalog order
//!
//! # Example
//!
//! ```
//! use gitpgm::cli::usage::Usage;
//! use gitpgm::core::text::Text;
//!
//! let text = Text::english();
//! let usage = Usage::new("gitpgm", &text);
//! assert_eq!(
//!     usage.synopsis(),
//!     "gitpgm [--help (-h)] [--show-stack-trace] [--git-dir GIT_DIR] command [ARG ...]"
//! );
//! ```

use crate::cli::args::Schema;
use crate::cli::commands::CommandRef;
use crate::core::text::Text;

/// One declared option, as shown in help output.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OptionLine {
    label: String,
    usage_key: String,
}

/// Renders help text for one program name and message table.
#[derive(Debug, Clone, Copy)]
pub struct Usage<'a> {
    program: &'a str,
    text: &'a Text,
}

impl<'a> Usage<'a> {
    pub fn new(program: &'a str, text: &'a Text) -> Self {
        Self { program, text }
    }

    /// `<program> <option summary> command [ARG ...]`
    pub fn synopsis(&self) -> String {
        let mut line = self.program.to_string();
        for option in options() {
            line.push_str(&format!(" [{}]", option.label));
        }
        line.push_str(" command [ARG ...]");
        line
    }

    /// One line per option: the option padded to the widest option plus two,
    /// then `: ` and its usage text.
    pub fn full_usage(&self) -> String {
        let options = options();
        let width = options.iter().map(|o| o.label.chars().count()).max().unwrap_or(0) + 2;

        let mut block = String::new();
        for option in &options {
            block.push_str(&format!(
                " {:<width$}: {}\n",
                option.label,
                self.text.get(&option.usage_key),
                width = width
            ));
        }
        block
    }

    /// The common-commands listing, one line per command.
    ///
    /// Names are not indented; each is right-padded to the longest name
    /// plus two columns.
    pub fn common_commands(&self, common: &[&CommandRef]) -> String {
        let width = common.iter().map(|c| c.name.chars().count()).max().unwrap_or(0) + 2;

        let mut listing = String::new();
        for command in common {
            listing.push_str(&format!(
                "{:<width$}{}\n",
                command.name,
                self.text.get(command.usage_key),
                width = width
            ));
        }
        listing
    }
}

/// Declared options in declaration order.
fn options() -> Vec<OptionLine> {
    Schema::definition()
        .get_arguments()
        .filter(|arg| !arg.is_positional())
        .filter_map(|arg| {
            let long = arg.get_long()?;
            let mut label = format!("--{}", long);
            if arg.get_action().takes_values() {
                if let Some(name) = arg.get_value_names().and_then(|names| names.first()) {
                    label.push(' ');
                    label.push_str(name.as_str());
                }
            }
            if let Some(short) = arg.get_short() {
                label.push_str(&format!(" (-{})", short));
            }
            Some(OptionLine {
                label,
                usage_key: arg.get_help().map(|h| h.to_string()).unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::{Activated, Builtin, InitContext};

    struct Nop;

    impl Builtin for Nop {
        fn init<'io>(self: Box<Self>, _ctx: InitContext<'io>) -> Box<dyn Activated + 'io> {
            unreachable!("never run in rendering tests")
        }
    }

    fn nop() -> Box<dyn Builtin> {
        Box::new(Nop)
    }

    fn command(name: &'static str, usage_key: &'static str) -> CommandRef {
        CommandRef::new(name, usage_key, nop)
    }

    #[test]
    fn synopsis_lists_options_in_declaration_order() {
        let text = Text::english();
        let usage = Usage::new("jgit", &text);
        assert_eq!(
            usage.synopsis(),
            "jgit [--help (-h)] [--show-stack-trace] [--git-dir GIT_DIR] command [ARG ...]"
        );
    }

    #[test]
    fn full_usage_aligns_descriptions() {
        let text = Text::english();
        let block = Usage::new("gitpgm", &text).full_usage();
        let lines: Vec<&str> = block.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], " --help (-h)         : display this help text");
        assert_eq!(
            lines[2],
            " --git-dir GIT_DIR   : set the git repository to operate on"
        );
        let colons: Vec<usize> = lines.iter().map(|l| l.find(": ").unwrap()).collect();
        assert!(colons.iter().all(|c| *c == colons[0]));
    }

    #[test]
    fn common_commands_width_is_longest_plus_two() {
        let text = Text::from_pairs([("u1", "first usage"), ("u2", "second usage")]);
        let log = command("log", "u1");
        let init = command("init", "u2");

        let listing = Usage::new("gitpgm", &text).common_commands(&[&log, &init]);

        assert_eq!(listing, "log   first usage\ninit  second usage\n");
    }

    #[test]
    fn common_commands_keep_catalog_order() {
        let text = Text::from_pairs([("k", "x")]);
        let b = command("bbbbbbb", "k");
        let a = command("a", "k");

        let listing = Usage::new("gitpgm", &text).common_commands(&[&b, &a]);

        assert_eq!(listing, "bbbbbbb  x\na        x\n");
    }

    #[test]
    fn common_commands_width_counts_characters() {
        let text = Text::from_pairs([("k", "X")]);
        let wide = command("éé", "k");
        let a = command("a", "k");

        let listing = Usage::new("gitpgm", &text).common_commands(&[&wide, &a]);

        assert_eq!(listing, "éé  X\na   X\n");
    }

    #[test]
    fn common_commands_empty() {
        let text = Text::english();
        assert_eq!(Usage::new("gitpgm", &text).common_commands(&[]), "");
    }
}
