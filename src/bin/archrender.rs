//! CLI for ArchRender - architectural renderings via AI.

use anyhow::Context;
use archrender::options::FieldKind;
use archrender::{
    prompt, GeminiModel, GeminiProvider, ImageInput, Phase, RenderControls, RenderOptions,
    SessionController,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "archrender")]
#[command(about = "Render architectural images from an input image and creative controls")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a rendering
    Render(RenderArgs),

    /// Print the compiled instruction without calling the service
    Prompt(FormArgs),

    /// List every control with its allowed values
    Options,
}

#[derive(Args)]
struct FormArgs {
    /// Input image (the building to render)
    input: PathBuf,

    /// Style reference image
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Set a control by form name, e.g. --set "timeOfDay=Golden Hour" (repeatable)
    #[arg(short, long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    form: FormArgs,

    /// Output file path (defaults to render.<ext> from the returned MIME type)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model to use
    #[arg(short, long, value_enum, default_value = "nano-banana")]
    model: ModelArg,

    /// API key (falls back to GOOGLE_API_KEY)
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    NanoBanana,
    NanoBananaPro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::NanoBanana => GeminiModel::NanoBanana,
            ModelArg::NanoBananaPro => GeminiModel::NanoBananaPro,
        }
    }
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got {s:?}"))?;
    Ok((field.trim().to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => {
            render(args, cli.json).await?;
        }
        Commands::Prompt(args) => {
            print_prompt(args, cli.json)?;
        }
        Commands::Options => {
            list_options(cli.json)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_options(form: &FormArgs) -> anyhow::Result<RenderOptions> {
    let input = ImageInput::from_path(&form.input)
        .with_context(|| format!("reading input image {}", form.input.display()))?;
    let mut options = RenderOptions::new().with_input_image(input);

    if let Some(ref path) = form.reference {
        let reference = ImageInput::from_path(path)
            .with_context(|| format!("reading reference image {}", path.display()))?;
        options = options.with_reference_image(reference);
    }

    for (field, value) in &form.set {
        options.controls.set(field, value)?;
    }

    Ok(options)
}

async fn render(args: RenderArgs, json_output: bool) -> anyhow::Result<()> {
    let options = load_options(&args.form)?;

    let mut builder = GeminiProvider::builder().model(args.model.into());
    if let Some(key) = args.api_key {
        builder = builder.api_key(key);
    }

    let session = SessionController::new(builder.build());
    session.set_input_image(options.input_image);
    session.set_reference_image(options.reference_image);
    session.update_controls(|controls| *controls = options.controls);

    let phase = session.generate().await;
    let snapshot = session.snapshot();

    let image = match (phase, snapshot.result) {
        (Phase::Succeeded, Some(image)) => image,
        _ => {
            let message = snapshot
                .error
                .unwrap_or_else(|| "generation did not complete".to_string());
            anyhow::bail!(message);
        }
    };

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("render.{}", image.extension())));
    let bytes = image.decode()?;
    std::fs::write(&output, &bytes)
        .with_context(|| format!("writing {}", output.display()))?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "output": output.display().to_string(),
            "size_bytes": bytes.len(),
            "mime_type": image.mime_type,
            "model": image.metadata.model,
            "duration_ms": image.metadata.duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated rendering: {} ({} bytes, {})",
            output.display(),
            bytes.len(),
            image.mime_type
        );
        if let Some(duration) = image.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
    }

    Ok(())
}

fn print_prompt(args: FormArgs, json_output: bool) -> anyhow::Result<()> {
    let options = load_options(&args)?;
    let input = options.require_input_image()?;
    let payload = prompt::compile(input, options.reference_image.as_ref(), &options.controls);

    if json_output {
        let images: Vec<_> = payload
            .images()
            .map(|image| {
                serde_json::json!({
                    "mime_type": image.mime_type(),
                    "size_bytes": image.size(),
                })
            })
            .collect();
        let result = serde_json::json!({
            "images": images,
            "text": payload.text(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", payload.text());
    }

    Ok(())
}

fn list_options(json_output: bool) -> anyhow::Result<()> {
    let catalog = RenderControls::catalog();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    println!("Controls (use --set FIELD=VALUE):\n");
    for field in &catalog {
        println!("  {} ({})", field.key, field.label);
        match &field.kind {
            FieldKind::Choice { options } => {
                for option in options {
                    let marker = if *option == field.default { "*" } else { " " };
                    println!("    {} {}", marker, option);
                }
            }
            FieldKind::Text => println!("    free text"),
            FieldKind::Toggle => println!("    true | false (default {})", field.default),
        }
    }

    Ok(())
}
