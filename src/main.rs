mod cli;

use autoposter::config::{Config, ProviderSelection};
use autoposter::error::{AutoposterError, ConfigError, StoreError};
use autoposter::media;
use autoposter::pipeline::{GenerateOutcome, Pipeline, PublishOutcome};
use autoposter::providers::Providers;
use autoposter::publish::{Publisher, TelegramChannel};
use autoposter::store::{
    AssetStore, ContextDocument, Draft, DraftStore, ExpertFace, FaceOutcome, IdeaPool,
    JsonFileStore, PromptOverrides,
};
use clap::Parser;
use mimalloc::MiMalloc;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command, ContextCommand, DraftCommand, FaceCommand, IdeasCommand, PromptsCommand};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cfg = Config::load(cli.config.as_deref())?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        data_dir = %cfg.basic.data_dir.display(),
        provider_cfg = %cfg.basic.provider_cfg.display(),
        loglevel = %cfg.basic.loglevel,
        telegram_api_url = %cfg.telegram.api_url,
        caption_limit = cfg.telegram.caption_limit,
        "Config loaded"
    );

    run(cli.command, &cfg).await?;
    Ok(())
}

async fn run(command: Command, cfg: &Config) -> Result<(), AutoposterError> {
    let store = JsonFileStore::new(&cfg.basic.data_dir);

    match command {
        Command::Generate => {
            let selection = ProviderSelection::load(&cfg.basic.provider_cfg)?;
            let providers = Providers::build(cfg, &selection)?;
            let outcome = Pipeline::new(&store, &selection).generate(&providers).await?;
            print_generated(&outcome);
        }
        Command::Publish { force } => {
            let selection = ProviderSelection::load(&cfg.basic.provider_cfg)?;
            let publisher = publisher(cfg)?;
            let outcome = Pipeline::new(&store, &selection)
                .publish(&publisher, force)
                .await?;
            print_published(&outcome);
        }
        Command::Full => {
            let selection = ProviderSelection::load(&cfg.basic.provider_cfg)?;
            let providers = Providers::build(cfg, &selection)?;
            let publisher = publisher(cfg)?;
            let (generated, published) = Pipeline::new(&store, &selection)
                .full(&providers, &publisher)
                .await?;
            print_generated(&generated);
            if let Some(published) = &published {
                print_published(published);
            }
        }
        Command::Ideas(IdeasCommand::List) => {
            for idea in store.list().await? {
                let mark = if idea.used { "x" } else { " " };
                println!("[{mark}] #{} {}", idea.id, idea.idea);
            }
        }
        Command::Ideas(IdeasCommand::Add { text }) => {
            let idea = store.add(&text).await?;
            println!("Added idea #{}: {}", idea.id, idea.idea);
        }
        Command::Draft(DraftCommand::Show) => match store.last_draft().await? {
            Some(draft) => print_draft(&draft),
            None => println!("No draft."),
        },
        Command::Draft(DraftCommand::Edit { text_file }) => {
            let text = read_text(&text_file).await?;
            let Some(mut draft) = store.load().await? else {
                println!("No pending draft to edit.");
                return Ok(());
            };
            draft.post_text = text.trim().to_string();
            store.replace_pending(&draft).await?;
            println!("Draft text updated ({} chars).", draft.post_text.chars().count());
        }
        Command::Face(FaceCommand::Set { image }) => {
            let bytes = read_bytes(&image).await?;
            let jpeg = media::to_jpeg(&bytes)?;
            store.set_expert_face(&ExpertFace { image: jpeg }).await?;
            println!("Expert face stored.");
        }
        Command::Prompts(PromptsCommand::Set {
            system_file,
            image_template,
        }) => {
            let current = store.prompts().await?;
            let system_prompt = match system_file {
                Some(path) => Some(read_text(&path).await?),
                None => current.system_prompt,
            };
            let prompts = PromptOverrides {
                system_prompt,
                image_prompt_template: image_template.or(current.image_prompt_template),
            };
            store.set_prompts(&prompts).await?;
            println!("Prompts updated.");
        }
        Command::Context(ContextCommand::Set { file }) => {
            let text = read_text(&file).await?;
            let filename = file
                .file_name()
                .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned());
            let doc = ContextDocument::new(filename, &text);
            store.set_context(&doc).await?;
            println!(
                "Context document {} stored ({} chars).",
                doc.filename,
                doc.text.chars().count()
            );
        }
        Command::Context(ContextCommand::Clear) => {
            store.clear_context().await?;
            println!("Context document cleared.");
        }
    }
    Ok(())
}

fn publisher(cfg: &Config) -> Result<Publisher<TelegramChannel>, ConfigError> {
    let channel = TelegramChannel::new(&cfg.telegram, &cfg.providers.defaults)?;
    Ok(Publisher::new(channel, cfg.telegram.caption_limit))
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>, StoreError> {
    tokio::fs::read(path).await.map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

async fn read_text(path: &Path) -> Result<String, StoreError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn print_generated(outcome: &GenerateOutcome) {
    match outcome {
        GenerateOutcome::NoIdeas => println!("No unused ideas left."),
        GenerateOutcome::Drafted(draft) => {
            println!("Draft ready for review.");
            print_draft(draft);
        }
    }
}

fn print_published(outcome: &PublishOutcome) {
    match outcome {
        PublishOutcome::Disabled => println!("Autopublish is disabled; use --force to publish."),
        PublishOutcome::NothingPending => println!("Nothing to publish."),
        PublishOutcome::Published { idea, receipt } => {
            println!("Published \"{idea}\" (message ids {:?}).", receipt.message_ids);
        }
    }
}

fn print_draft(draft: &Draft) {
    println!("status:   {:?}", draft.status);
    println!("idea:     {}", draft.idea);
    println!("created:  {}", draft.created_at);
    println!("text:     {}", draft.text_provider);
    println!("image:    {} ({} bytes)", draft.image_provider, draft.image.len());
    match &draft.face {
        FaceOutcome::NotRequested => println!("face:     not requested"),
        FaceOutcome::Inline { provider } => println!("face:     inline via {provider}"),
        FaceOutcome::Swapped { provider } => println!("face:     swapped via {provider}"),
        FaceOutcome::Degraded { provider, reason } => {
            println!("face:     NOT APPLIED ({provider}): {reason}");
        }
    }
    if let Some(at) = draft.published_at {
        println!("published: {at} {:?}", draft.message_ids);
    }
    println!();
    println!("{}", draft.post_text);
}
