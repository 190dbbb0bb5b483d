use anyhow::{Context, Result};
use shefi::cli::{apply_preference, parse_args, Command, RecipeRef, ReplCommand, REPL_HELP};
use shefi::config::Config;
use shefi::converter::{convert, parse_amount, Category};
use shefi::error::SessionError;
use shefi::media::VideoLink;
use shefi::model::{ChatRole, Recipe};
use shefi::prompt::preference_lines;
use shefi::session::Session;
use shefi::view::View;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const ABOUT_TEXT: &str = "Shefi turns the ingredients you already have into recipe ideas. \
Suggestions, answers and comment replies are generated by an AI model and may be wrong; \
check allergens and cooking temperatures yourself.";

fn init_logging(verbose: bool) {
    let default_level = if verbose { "shefi=debug" } else { "shefi=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_convert(category: &str, amount: &str, from: &str, to: &str) -> Result<String> {
    let category: Category = category.parse()?;
    let amount = parse_amount(amount)?;
    let converted = convert(category, amount, from, to)?;
    Ok(format!("{} {} = {} {}", amount, from, converted, to))
}

fn print_recipe_summary(position: usize, recipe: &Recipe) {
    println!(
        "{:>2}. {}{} [{}] {} | {} | match {}%",
        position,
        if recipe.is_favorite { "♥ " } else { "" },
        recipe.title,
        recipe.id,
        recipe.prep_time,
        recipe.difficulty,
        recipe.match_score
    );
}

fn print_recipe_list(recipes: &[Recipe], empty_message: &str) {
    if recipes.is_empty() {
        println!("{}", empty_message);
        return;
    }
    for (index, recipe) in recipes.iter().enumerate() {
        print_recipe_summary(index + 1, recipe);
    }
}

fn print_recipe(recipe: &Recipe) {
    println!("\n== {} ==", recipe.title);
    println!("{}", recipe.description);
    let calories = recipe
        .calories
        .map(|kcal| format!(" | {} kcal", kcal))
        .unwrap_or_default();
    println!(
        "{} | {} | {} | {}{}",
        recipe.prep_time, recipe.difficulty, recipe.meal_size, recipe.health_tag, calories
    );
    if !recipe.tags.is_empty() {
        println!("tags: {}", recipe.tags.join(", "));
    }
    if let Some(url) = &recipe.image_url {
        println!("image: {}", url);
    }
    println!("\nIngredients:");
    for ingredient in &recipe.ingredients {
        println!("  - {}", ingredient);
    }
    println!("\nInstructions:");
    for (step, instruction) in recipe.instructions.iter().enumerate() {
        println!("  {}. {}", step + 1, instruction);
    }
    if let Some(url) = &recipe.video_url {
        println!("\nvideo: {}", url);
    }
    if !recipe.comments.is_empty() {
        println!("\nComments:");
        for comment in &recipe.comments {
            println!("  [{}] {}: {}", comment.id, comment.author, comment.text);
        }
    }
}

/// Resolves a position against the list currently on screen.
fn resolve(session: &Session, reference: &RecipeRef) -> Result<String, SessionError> {
    match reference {
        RecipeRef::Id(id) => Ok(id.clone()),
        RecipeRef::Position(n) => {
            let list = if session.view() == &View::Favorites {
                session.favorites()
            } else {
                session.results()
            };
            n.checked_sub(1)
                .and_then(|i| list.get(i))
                .map(|r| r.id.clone())
                .ok_or_else(|| SessionError::RecipeNotFound(format!("#{}", n)))
        }
    }
}

fn open_recipe_id(session: &Session) -> Result<String, SessionError> {
    session
        .active_recipe()
        .map(|r| r.id.clone())
        .ok_or(SessionError::NoRecipeOpen)
}

/// Runs one REPL command. Returns `false` when the session should end.
async fn execute(session: &mut Session, command: ReplCommand) -> Result<bool, SessionError> {
    match command {
        ReplCommand::Add(items) => {
            for item in items {
                if !session.add_ingredient(&item) {
                    println!("skipped '{}'", item);
                }
            }
            println!("ingredients: {}", session.ingredients().join(", "));
        }
        ReplCommand::Remove(item) => {
            session.remove_ingredient(&item);
            println!("ingredients: {}", session.ingredients().join(", "));
        }
        ReplCommand::Clear => {
            session.clear_all();
            println!("cleared ingredients and preferences");
        }
        ReplCommand::Pref { key, value } => {
            match apply_preference(session.preferences_mut(), &key, value.as_deref()) {
                Ok(()) => print!("{}", preference_lines(session.preferences())),
                Err(message) => println!("{}", message),
            }
        }
        ReplCommand::Prefs => {
            if session.preferences().is_empty() {
                println!("no preferences set");
            } else {
                print!("{}", preference_lines(session.preferences()));
            }
        }
        ReplCommand::Search => {
            if session.ingredients().is_empty() {
                println!("add some ingredients first");
            } else {
                println!("Shefi is thinking...");
                let results = session.search().await?;
                print_recipe_list(results, "no recipes found");
            }
        }
        ReplCommand::Open(reference) => {
            let id = resolve(session, &reference)?;
            print_recipe(session.open_recipe(&id)?);
        }
        ReplCommand::Favorite(reference) => {
            let id = match reference {
                Some(reference) => resolve(session, &reference)?,
                None => open_recipe_id(session)?,
            };
            let saved = session.toggle_favorite(&id)?;
            println!("{}", if saved { "saved to favorites" } else { "removed from favorites" });
        }
        ReplCommand::Back => {
            let view = session.back().clone();
            println!("-> {}", view.name());
        }
        ReplCommand::Home => {
            session.navigate(View::Home)?;
            print_recipe_list(session.results(), "no results yet, try 'search'");
        }
        ReplCommand::Favorites => {
            session.navigate(View::Favorites)?;
            print_recipe_list(session.favorites(), "no favorites yet");
        }
        ReplCommand::About => {
            session.navigate(View::About)?;
            println!("{}", ABOUT_TEXT);
        }
        ReplCommand::Messages => {
            session.navigate(View::Messages)?;
            if let Some(tip) = session.daily_tip() {
                println!("Tip of the day: {}", tip);
            }
            let threads = session.message_threads();
            if threads.is_empty() {
                println!("no replies yet");
            }
            for thread in threads {
                println!("\n[{}] {}", thread.recipe_title, thread.replied_at().format("%Y-%m-%d %H:%M"));
                if let Some(question) = &thread.question {
                    println!("  {}: {}", question.author, question.text);
                }
                println!("  {}: {}", thread.reply.author, thread.reply.text);
            }
        }
        ReplCommand::Converter => {
            session.navigate(View::Converter)?;
            for category in [Category::Temperature, Category::Weight, Category::Volume] {
                let units: Vec<&str> = category.units().iter().map(|u| u.id).collect();
                let (from, to) = category.default_pair();
                println!("{:?}: {} (e.g. {} -> {})", category, units.join(", "), from, to);
            }
            println!("convert <temp|weight|volume> <amount> <from> <to>");
        }
        ReplCommand::Video => {
            let id = open_recipe_id(session)?;
            let url = session.find_video(&id).await?;
            match VideoLink::from_url(&url) {
                VideoLink::Embed { embed_url, .. } => println!("video: {}", embed_url),
                VideoLink::External(link) => println!("no embeddable video, search: {}", link),
            }
        }
        ReplCommand::Regenerate(missing) => {
            let id = open_recipe_id(session)?;
            println!("looking for a substitute...");
            let recipe = session.regenerate(&id, &missing).await?;
            print_recipe(&recipe);
        }
        ReplCommand::Comment { author, text } => {
            let id = open_recipe_id(session)?;
            let reply = session.submit_comment(&id, &author, &text).await?;
            println!("{}: {}", reply.author, reply.text);
        }
        ReplCommand::Delete(comment_id) => {
            let id = open_recipe_id(session)?;
            session.delete_comment(&id, &comment_id)?;
            println!("comment deleted");
        }
        ReplCommand::Tip => {
            let tip = session.load_daily_tip().await?;
            println!("Tip of the day: {}", tip);
        }
        ReplCommand::Chat(message) => {
            if let Some(turn) = session.chat(&message).await? {
                println!("Shefi: {}", turn.text);
            }
        }
        ReplCommand::Convert {
            category,
            amount,
            from,
            to,
        } => match run_convert(&category, &amount, &from, &to) {
            Ok(line) => println!("{}", line),
            Err(e) => println!("{}", e),
        },
        ReplCommand::Help => println!("{}", REPL_HELP),
        ReplCommand::Quit => return Ok(false),
    }
    Ok(true)
}

async fn run_session(mut session: Session) -> Result<()> {
    if let Some(turn) = session.chat_turns().first().filter(|t| t.role == ChatRole::Model) {
        println!("Shefi: {}", turn.text);
    }
    println!("(answers by {}) type 'help' for commands", session.gateway_name());
    if let Ok(tip) = session.load_daily_tip().await {
        println!("(new message) Tip of the day: {}", tip);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let marker = if session.has_notification() { "*" } else { "" };
        print!("shefi:{}{}> ", session.view().name(), marker);
        std::io::Write::flush(&mut std::io::stdout()).context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        debug!(?command, "repl command");
        match execute(&mut session, command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("{}", e.user_message()),
        }
    }
    info!("session ended");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = parse_args();
    init_logging(cli_args.verbose);

    if let Some(Command::Convert {
        category,
        amount,
        from,
        to,
    }) = &cli_args.command
    {
        println!("{}", run_convert(category, amount, from, to)?);
        return Ok(());
    }

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(model) = &cli_args.model {
        config.model = model.clone();
    }
    config.offline = cli_args.offline;
    config.validate().context("Invalid configuration")?;

    let gateway = config.gateway()?;
    info!(gateway = gateway.name(), offline = config.offline, "starting session");
    let session = Session::new(gateway, config.image_size);
    run_session(session).await
}
