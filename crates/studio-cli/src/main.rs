//! Studio CLI: command-line editing surface for images on the configured host.
//!
//! Set CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET. The asset
//! registry lives in STUDIO_DATABASE_URL (default: ./studio.db).

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use studio_cli::{
    init_tracing, parse_metadata, parse_radius, print_json, setup_required_message,
    truncate_string, ErrorReport,
};
use studio_core::models::{
    AssetOrderBy, AssetUpdate, Flip, ListAssetsQuery, Radius, SortOrder, Transformation,
    UploadMethod, UploadOptions, UploadStatus,
};
use studio_core::{find_preset, presets_in, AppError, PresetCategory, StudioConfig, PRESETS};
use studio_db::Database;
use studio_services::{AssetService, ProgressCallback, StagedFile, UploadOrchestrator};

#[derive(Parser)]
#[command(name = "studio", about = "Image upload and transformation studio")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether the image host credentials are set
    CheckConfig,
    /// Upload an image file
    Upload {
        /// Path to the image
        file: PathBuf,
        /// Target folder (defaults depend on the upload path)
        #[arg(long)]
        folder: Option<String>,
        /// auto, base64 or direct
        #[arg(long, default_value = "auto")]
        method: UploadMethod,
    },
    /// List recorded assets
    List {
        #[arg(long)]
        folder: Option<String>,
        /// Require this tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        user: Option<String>,
        /// uploadedAt or updatedAt
        #[arg(long, default_value = "uploadedAt")]
        order_by: AssetOrderBy,
        /// asc or desc
        #[arg(long, default_value = "desc")]
        order: SortOrder,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one asset
    Get {
        /// Public ID of the asset
        public_id: String,
    },
    /// Replace an asset's tags or metadata
    Update {
        public_id: String,
        /// New tag set (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Delete an asset from the host and the registry
    Delete { public_id: String },
    /// Build a derived URL for an asset
    Transform {
        public_id: String,
        /// Apply a named preset (repeatable, applied in order)
        #[arg(long = "preset")]
        presets: Vec<String>,
        #[command(flatten)]
        params: TransformArgs,
    },
    /// List the transformation presets
    Presets {
        #[arg(long)]
        category: Option<PresetCategory>,
    },
    /// Generate signed parameters for a direct upload
    Credentials {
        #[arg(long)]
        filename: Option<String>,
        #[arg(long)]
        folder: Option<String>,
    },
    /// List direct upload records by status
    Pending {
        #[arg(long, default_value = "pending")]
        status: UploadStatus,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Remove a direct upload record
    PendingDelete { id: String },
}

#[derive(clap::Args)]
struct TransformArgs {
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long)]
    crop: Option<String>,
    #[arg(long)]
    quality: Option<String>,
    #[arg(long)]
    format: Option<String>,
    #[arg(long)]
    gravity: Option<String>,
    /// Pixels or `max`
    #[arg(long, value_parser = parse_radius)]
    radius: Option<Radius>,
    #[arg(long)]
    overlay: Option<String>,
    #[arg(long)]
    effect: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    angle: Option<i32>,
    #[arg(long)]
    zoom: Option<f64>,
    #[arg(long)]
    background: Option<String>,
    #[arg(long)]
    dpr: Option<f64>,
    #[arg(long)]
    opacity: Option<u8>,
    #[arg(long)]
    border: Option<String>,
    #[arg(long, value_parser = parse_flip)]
    flip: Option<Flip>,
}

impl TransformArgs {
    fn into_transformation(self) -> Transformation {
        Transformation {
            width: self.width,
            height: self.height,
            crop: self.crop,
            quality: self.quality,
            format: self.format,
            gravity: self.gravity,
            radius: self.radius,
            overlay: self.overlay,
            effect: self.effect,
            angle: self.angle,
            zoom: self.zoom,
            background: self.background,
            dpr: self.dpr,
            opacity: self.opacity,
            border: self.border,
            flip: self.flip,
            ..Default::default()
        }
    }
}

fn parse_flip(s: &str) -> Result<Flip, String> {
    match s.to_lowercase().as_str() {
        "horizontal" | "h" => Ok(Flip::Horizontal),
        "vertical" | "v" => Ok(Flip::Vertical),
        other => Err(format!("Invalid flip '{}': expected horizontal or vertical", other)),
    }
}

fn require_configured(service: &AssetService) -> anyhow::Result<()> {
    if !service.check_config() {
        return Err(AppError::NotConfigured(
            "Cloudinary environment variables not set".to_string(),
        )
        .into());
    }
    Ok(())
}

fn progress_logger(name: &str) -> ProgressCallback {
    let name = truncate_string(name, 40);
    Arc::new(move |percent| tracing::info!(file = %name, percent, "Upload progress"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = StudioConfig::from_env().context("Failed to load configuration");
    let production = config
        .as_ref()
        .map(StudioConfig::is_production)
        .unwrap_or(false);
    init_tracing(production);

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let report = ErrorReport::from_error(&err, production);
            match serde_json::to_string_pretty(&report) {
                Ok(out) => eprintln!("{}", out),
                Err(_) => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StudioConfig) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;

    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to open asset registry")?;
    db.migrate().await.context("Failed to migrate asset registry")?;

    let service = Arc::new(AssetService::from_config(&config, &db)?);

    match cli.command {
        Commands::CheckConfig => {
            let configured = service.check_config();
            if !configured {
                eprintln!("{}", setup_required_message());
            }
            print_json(&serde_json::json!({ "configured": configured }))?;
        }
        Commands::Upload {
            file,
            folder,
            method,
        } => {
            require_configured(&service)?;

            let staged = StagedFile::from_path(&file).await?;
            let orchestrator =
                UploadOrchestrator::new(service.clone(), config.direct_upload_threshold_bytes);
            let progress = progress_logger(&staged.name);

            let outcome = orchestrator
                .perform_upload(&staged, folder.as_deref(), method, Some(progress))
                .await?;
            print_json(&outcome)?;
        }
        Commands::List {
            folder,
            tags,
            user,
            order_by,
            order,
            limit,
        } => {
            if !service.check_config() {
                tracing::warn!("Image host not configured; showing an empty library");
                print_json(&Vec::<serde_json::Value>::new())?;
                return Ok(());
            }

            let query = ListAssetsQuery {
                folder,
                tags,
                user_id: user,
                order_by,
                order,
                limit,
            };
            let assets = service.list_assets(&query).await?;
            print_json(&assets)?;
        }
        Commands::Get { public_id } => {
            let asset = service
                .get_asset(&public_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", public_id)))?;
            print_json(&asset)?;
        }
        Commands::Update {
            public_id,
            tags,
            metadata,
        } => {
            let update = AssetUpdate {
                tags: (!tags.is_empty()).then_some(tags),
                metadata: metadata.as_deref().map(parse_metadata).transpose()?,
            };
            if update.is_empty() {
                return Err(AppError::InvalidInput(
                    "Nothing to update: pass --tag or --metadata".to_string(),
                )
                .into());
            }

            let asset = service.update_asset(&public_id, update).await?;
            print_json(&asset)?;
        }
        Commands::Delete { public_id } => {
            require_configured(&service)?;

            let result = service.delete_asset(&public_id).await?;
            print_json(&result)?;
            if !result.success {
                let reason = result.error.unwrap_or_else(|| "unknown error".to_string());
                return Err(AppError::Remote(format!(
                    "Delete failed for {}: {}",
                    public_id, reason
                ))
                .into());
            }
        }
        Commands::Transform {
            public_id,
            presets,
            params,
        } => {
            require_configured(&service)?;

            let mut transformation = Transformation::default();
            for name in &presets {
                let preset = find_preset(name)
                    .ok_or_else(|| AppError::InvalidInput(format!("Unknown preset: {}", name)))?;
                transformation.merge(&preset.transformation());
            }
            transformation.merge(&params.into_transformation());

            let result = service.transform(&public_id, &transformation).await?;
            print_json(&result)?;
        }
        Commands::Presets { category } => {
            let presets: Vec<_> = match category {
                Some(category) => presets_in(category).collect(),
                None => PRESETS.iter().collect(),
            };
            let listing: Vec<_> = presets
                .into_iter()
                .map(|p| {
                    serde_json::json!({
                        "name": p.name,
                        "category": p.category,
                        "description": p.description,
                        "transformation": p.transformation(),
                    })
                })
                .collect();
            print_json(&listing)?;
        }
        Commands::Credentials { filename, folder } => {
            require_configured(&service)?;

            let credentials = service.generate_upload_credentials(UploadOptions {
                filename,
                folder,
                ..Default::default()
            })?;
            print_json(&credentials)?;
        }
        Commands::Pending {
            status,
            user,
            limit,
        } => {
            let uploads = service
                .get_uploads_by_status(status, user.as_deref(), limit)
                .await?;
            print_json(&uploads)?;
        }
        Commands::PendingDelete { id } => {
            let removed = service.delete_pending_upload(&id).await?;
            print_json(&serde_json::json!({ "id": id, "removed": removed }))?;
        }
    }

    Ok(())
}
