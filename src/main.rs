use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use image_analyst::app::App;
use image_analyst::config::Config;
use image_analyst::frontend::{self, Format, HtmlPresenter, Presenter, PreviewImage, RenderContext};
use image_analyst::image::Upload;
use image_analyst::server::create_router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "image-analyst", version)]
#[command(about = "Ask a multimodal model questions about an image")]
struct Cli {
    /// Gemini model to use instead of GEMINI_MODEL.
    #[arg(long, global = true, value_name = "MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze a single image file and print the answer.
    Analyze(AnalyzeArgs),
    /// Serve the upload form over HTTP.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// Image to analyze (jpg, jpeg or png).
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// What you would like to know about the image.
    #[arg(short, long, default_value = "")]
    question: String,

    #[arg(short, long, value_enum, default_value_t = Format::Plain)]
    format: Format,
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// Address to listen on instead of BIND_ADDR.
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout is reserved for rendered output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_analyst=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(model) = cli.model {
        config.model = model;
    }

    match cli.command {
        Command::Analyze(args) => {
            if !analyze(args, &config).await {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Serve(args) => {
            if let Some(bind) = args.bind {
                config.bind_addr = bind;
            }
            serve(config).await
        }
    }
}

/// Runs one analysis and prints the outcome. Returns whether it succeeded.
async fn analyze(args: AnalyzeArgs, config: &Config) -> bool {
    let app = App::from_config(config);
    let presenter = frontend::presenter_for(args.format);

    let (outcome, preview) = match Upload::from_path(&args.image).await {
        Ok(upload) => {
            let preview = PreviewImage::from_upload(&upload);
            if let Some(preview) = &preview {
                info!("{}", preview.caption);
            }
            (app.analyze(Some(upload), &args.question).await, preview)
        }
        Err(e) => (Err(e), None),
    };

    let context = RenderContext::new(app.model(), &args.question).with_preview(preview.as_ref());
    match outcome {
        Ok(result) => {
            print!("{}", presenter.render_result(&result, &context));
            true
        }
        Err(e) => {
            print!("{}", presenter.render_error(&e, &context));
            false
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    let app = Arc::new(App::from_config(&config));
    let router = create_router(app, HtmlPresenter::new());

    info!("Starting server on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received SIGTERM signal"),
    }
}
