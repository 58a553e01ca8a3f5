use anyhow::{bail, Context, Result};

use learnit::models::LearningContent;
use learnit::services::bookmarks::BookmarkStore;
use learnit::services::openai::{OpenAiClient, OpenAiConfig};
use learnit::utils;

const USAGE: &str = "usage: learnit <topic>
       learnit --save <topic>
       learnit --bookmarks
       learnit --clear";

#[derive(Debug, PartialEq)]
enum Command {
    Fetch { topic: String, save: bool },
    ListBookmarks,
    ClearBookmarks,
    Usage,
}

fn parse_args(args: &[String]) -> Result<Command> {
    match args.first().map(String::as_str) {
        None => Ok(Command::Usage),
        Some("--bookmarks") => Ok(Command::ListBookmarks),
        Some("--clear") => Ok(Command::ClearBookmarks),
        Some("--save") => {
            let topic = args.get(1).context(USAGE)?;
            Ok(Command::Fetch {
                topic: topic.clone(),
                save: true,
            })
        }
        Some(flag) if flag.starts_with("--") => {
            bail!("unknown option: {}\n{}", flag, USAGE)
        }
        Some(topic) => Ok(Command::Fetch {
            topic: topic.to_string(),
            save: false,
        }),
    }
}

fn setup_logging() -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args) {
        Ok(Command::Fetch { topic, save }) => fetch_topic(&topic, save).await,
        Ok(Command::ListBookmarks) => list_bookmarks(),
        Ok(Command::ClearBookmarks) => clear_bookmarks(),
        Ok(Command::Usage) => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(2);
        }
    }
}

fn open_store() -> Result<BookmarkStore> {
    BookmarkStore::open(&utils::get_database_path())
}

async fn fetch_topic(topic: &str, save: bool) -> Result<()> {
    let config = OpenAiConfig::from_env()?;
    let client = OpenAiClient::new(config)?;

    log::info!("fetching learning content for \"{}\"", topic);
    let content = client.fetch_learning_content(topic).await?;

    if content.is_placeholder() {
        log::warn!("response carried no recognizable content");
    }
    print_content(&content);

    if save {
        open_store()?.append(content)?;
        log::info!("saved to bookmarks");
    }
    Ok(())
}

fn print_content(content: &LearningContent) {
    println!("Summary");
    println!("-------");
    println!("{}\n", content.summary);

    if !content.quiz_questions.is_empty() {
        println!("Quiz");
        println!("----");
        for (index, question) in content.quiz_questions.iter().enumerate() {
            println!("Q{}: {}", index + 1, question.question);
            println!("  Correct: {}", question.correct_answer);
            println!("  Wrong:   {}", question.wrong_answers.join(" | "));
        }
        println!();
    }

    if !content.predicted_questions.is_empty() {
        println!("Predicted Questions");
        println!("-------------------");
        for predicted in &content.predicted_questions {
            println!("- {}", predicted);
        }
    }
}

fn list_bookmarks() -> Result<()> {
    let store = open_store()?;
    let items = store.load()?;

    if items.is_empty() {
        println!("No bookmarks saved.");
        return Ok(());
    }

    for item in &items {
        let mut preview: String = item.summary.chars().take(60).collect();
        if item.summary.chars().count() > 60 {
            preview.push_str("...");
        }
        println!(
            "{}  {}  {} questions  {}",
            item.id,
            item.created_at.format("%Y-%m-%d"),
            item.quiz_questions.len(),
            preview
        );
    }
    println!(
        "\nCache size: {}",
        utils::format_size_mb(store.cache_size_bytes()?)
    );
    Ok(())
}

fn clear_bookmarks() -> Result<()> {
    open_store()?.clear()?;
    log::info!("cleared all bookmarks");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_topic() {
        assert_eq!(
            parse_args(&args(&["Graphs"])).unwrap(),
            Command::Fetch {
                topic: "Graphs".to_string(),
                save: false,
            }
        );
    }

    #[test]
    fn test_parse_args_save() {
        assert_eq!(
            parse_args(&args(&["--save", "Graphs"])).unwrap(),
            Command::Fetch {
                topic: "Graphs".to_string(),
                save: true,
            }
        );
        assert!(parse_args(&args(&["--save"])).is_err());
    }

    #[test]
    fn test_parse_args_known_flags() {
        assert_eq!(
            parse_args(&args(&["--bookmarks"])).unwrap(),
            Command::ListBookmarks
        );
        assert_eq!(
            parse_args(&args(&["--clear"])).unwrap(),
            Command::ClearBookmarks
        );
    }

    #[test]
    fn test_parse_args_rejects_unknown_flags() {
        for flag in ["--help", "--verbose", "--bookmark"] {
            let err = parse_args(&args(&[flag])).unwrap_err();
            assert!(err.to_string().contains("unknown option"), "{}", flag);
        }
    }

    #[test]
    fn test_parse_args_empty() {
        assert_eq!(parse_args(&[]).unwrap(), Command::Usage);
    }
}
