use clap::{Parser, Subcommand};

use crate::model::{Cuisine, Preferences};

#[derive(Parser, Debug)]
#[command(author, version, about = "Shefi: recipes from what's in your kitchen", long_about = None)]
pub struct Cli {
    /// Run without calling the AI service; every answer comes from the built-in fallbacks
    #[arg(long)]
    pub offline: bool,

    /// Gemini model to use (overrides SHEFI_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Convert one cooking quantity and exit
    Convert {
        /// temp, weight or volume
        category: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
        from: String,
        to: String,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

/// A recipe named on the REPL line: a 1-based position in the list on screen, or an id.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeRef {
    Position(usize),
    Id(String),
}

impl RecipeRef {
    fn parse(arg: &str) -> Self {
        match arg.parse::<usize>() {
            Ok(n) => RecipeRef::Position(n),
            Err(_) => RecipeRef::Id(arg.to_string()),
        }
    }
}

/// One line typed into the interactive session.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Add(Vec<String>),
    Remove(String),
    Clear,
    Pref { key: String, value: Option<String> },
    Prefs,
    Search,
    Open(RecipeRef),
    Favorite(Option<RecipeRef>),
    Back,
    Home,
    Favorites,
    About,
    Messages,
    Converter,
    Video,
    Regenerate(String),
    Comment { author: String, text: String },
    Delete(String),
    Tip,
    Chat(String),
    Convert { category: String, amount: String, from: String, to: String },
    Help,
    Quit,
}

pub const REPL_HELP: &str = "\
add <a, b, ...>         add ingredients
remove <ingredient>     remove an ingredient
clear                   clear ingredients and preferences
pref <key> [value]      toggle a preference (prefs lists them)
search                  suggest recipes
open <n|id>             show a recipe
fav [n|id]              toggle favorite (defaults to the open recipe)
video                   find a video for the open recipe
regen <missing>         rework the open recipe without some ingredients
comment <name>: <text>  comment on the open recipe
delete <comment id>     delete a comment from the open recipe
back | home | favorites | messages | about | converter
tip                     tip of the day
chat <message>          talk to Shefi
convert <category> <amount> <from> <to>
quit";

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let require = |what: &str| -> Result<String, String> {
            if rest.is_empty() {
                Err(format!("usage: {} {}", word, what))
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match word.to_lowercase().as_str() {
            "add" => ReplCommand::Add(
                require("<ingredient, ...>")?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            "remove" | "rm" => ReplCommand::Remove(require("<ingredient>")?),
            "clear" => ReplCommand::Clear,
            "pref" => {
                let arg = require("<key> [value]")?;
                let (key, value) = match arg.split_once(char::is_whitespace) {
                    Some((key, value)) => (key.to_string(), Some(value.trim().to_string())),
                    None => (arg, None),
                };
                ReplCommand::Pref { key, value }
            }
            "prefs" => ReplCommand::Prefs,
            "search" | "go" => ReplCommand::Search,
            "open" => ReplCommand::Open(RecipeRef::parse(&require("<n|id>")?)),
            "fav" => ReplCommand::Favorite((!rest.is_empty()).then(|| RecipeRef::parse(rest))),
            "back" => ReplCommand::Back,
            "home" => ReplCommand::Home,
            "favorites" | "favs" => ReplCommand::Favorites,
            "about" => ReplCommand::About,
            "messages" | "inbox" => ReplCommand::Messages,
            "converter" => ReplCommand::Converter,
            "video" => ReplCommand::Video,
            "regen" => ReplCommand::Regenerate(require("<missing ingredients>")?),
            "comment" => {
                let arg = require("<name>: <text>")?;
                let (author, text) = arg
                    .split_once(':')
                    .ok_or_else(|| "usage: comment <name>: <text>".to_string())?;
                ReplCommand::Comment {
                    author: author.trim().to_string(),
                    text: text.trim().to_string(),
                }
            }
            "delete" => ReplCommand::Delete(require("<comment id>")?),
            "tip" => ReplCommand::Tip,
            "chat" => ReplCommand::Chat(require("<message>")?),
            "convert" => {
                let args: Vec<&str> = rest.split_whitespace().collect();
                match args.as_slice() {
                    [category, amount, from, to] => ReplCommand::Convert {
                        category: category.to_string(),
                        amount: amount.to_string(),
                        from: from.to_string(),
                        to: to.to_string(),
                    },
                    _ => return Err("usage: convert <category> <amount> <from> <to>".to_string()),
                }
            }
            "help" | "?" => ReplCommand::Help,
            "quit" | "exit" => ReplCommand::Quit,
            "" => return Err("type 'help' for commands".to_string()),
            other => return Err(format!("unknown command '{}', type 'help'", other)),
        };
        Ok(command)
    }
}

fn parse_choice<T: serde::de::DeserializeOwned>(key: &str, value: Option<&str>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("pref {} needs a value", key))?;
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|_| format!("'{}' is not a valid {}", value, key))
}

/// Applies one `pref` line. Choices toggle off when repeated; flags toggle.
pub fn apply_preference(prefs: &mut Preferences, key: &str, value: Option<&str>) -> Result<(), String> {
    match key.to_lowercase().as_str() {
        "difficulty" => prefs.toggle_difficulty(parse_choice(key, value)?),
        "size" => prefs.toggle_meal_size(parse_choice(key, value)?),
        "dietary" | "kosher" => prefs.toggle_dietary(parse_choice(key, value)?),
        "method" => prefs.toggle_method(parse_choice(key, value)?),
        "course" => prefs.toggle_course(parse_choice(key, value)?),
        "cuisine" => match parse_choice::<Cuisine>(key, value) {
            Ok(cuisine) => prefs.toggle_cuisine(cuisine),
            Err(_) => {
                let custom = value.ok_or_else(|| "pref cuisine needs a value".to_string())?;
                prefs.cuisine = Some(Cuisine::Other);
                prefs.custom_cuisine = Some(custom.to_string());
            }
        },
        "vegetarian" => prefs.toggle_vegetarian(),
        "vegan" => prefs.toggle_vegan(),
        "kids" => prefs.toggle_kid_friendly(),
        "healthy" => prefs.toggle_healthy(),
        "note" => prefs.refinement = value.map(str::to_string),
        other => return Err(format!("unknown preference '{}'", other)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_starts_an_online_session() {
        let cli = Cli::try_parse_from(["shefi"]).unwrap();
        assert!(!cli.offline);
        assert_eq!(cli.model, None);
        assert_eq!(cli.command, None);
    }

    #[test]
    fn convert_subcommand_takes_four_positionals() {
        let cli = Cli::try_parse_from(["shefi", "convert", "weight", "2", "lb", "g"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Convert {
                category: "weight".to_string(),
                amount: "2".to_string(),
                from: "lb".to_string(),
                to: "g".to_string(),
            })
        );
    }

    #[test]
    fn repl_lines_parse() {
        assert_eq!(
            ReplCommand::parse("add  tomato, onion ,"),
            Ok(ReplCommand::Add(vec!["tomato".to_string(), "onion".to_string()]))
        );
        assert_eq!(
            ReplCommand::parse("open 2"),
            Ok(ReplCommand::Open(RecipeRef::Position(2)))
        );
        assert_eq!(ReplCommand::parse("fav"), Ok(ReplCommand::Favorite(None)));
        assert_eq!(
            ReplCommand::parse("comment Dana: so good: really"),
            Ok(ReplCommand::Comment {
                author: "Dana".to_string(),
                text: "so good: really".to_string()
            })
        );
        assert!(ReplCommand::parse("regen").is_err());
        assert!(ReplCommand::parse("dance").is_err());
    }

    #[test]
    fn preferences_toggle_from_text() {
        let mut prefs = Preferences::default();
        apply_preference(&mut prefs, "difficulty", Some("Easy")).unwrap();
        apply_preference(&mut prefs, "method", Some("no-cook")).unwrap();
        apply_preference(&mut prefs, "vegan", None).unwrap();
        assert_eq!(prefs.difficulty, Some(crate::model::Difficulty::Easy));
        assert_eq!(prefs.method, Some(crate::model::CookingMethod::NoCook));
        assert_eq!(prefs.vegan, Some(true));

        apply_preference(&mut prefs, "difficulty", Some("easy")).unwrap();
        assert_eq!(prefs.difficulty, None);
        assert!(apply_preference(&mut prefs, "size", Some("huge")).is_err());
    }

    #[test]
    fn unknown_cuisine_becomes_custom() {
        let mut prefs = Preferences::default();
        apply_preference(&mut prefs, "cuisine", Some("Georgian")).unwrap();
        assert_eq!(prefs.effective_cuisine().as_deref(), Some("Georgian"));
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from(["shefi", "--offline", "-m", "gemini-2.0-flash", "-v"]).unwrap();
        assert!(cli.offline);
        assert!(cli.verbose);
        assert_eq!(cli.model.as_deref(), Some("gemini-2.0-flash"));
    }
}
