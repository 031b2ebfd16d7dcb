//! `folio admin ...`: authenticated content management.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use folio_core::auth::{CredentialStore, Session};
use folio_core::models::RecordId;
use folio_core::services::storage::IMAGES_BUCKET;
use folio_core::services::{
    is_valid_image, BlogService, CertificationsService, ContactService, ProjectService,
    ResumeService, SkillsService, StorageService, TableService, UploadFile,
};
use folio_core::utils::{format_timestamp, truncate_text, RateLimiter};
use folio_core::{Backend, Config, FetchResult, Query, Resource};

use crate::{flag_value, has_flag, Context};

fn print_usage() {
    eprintln!("Usage: folio admin <command>");
    eprintln!();
    eprintln!("  login [--email E] [--remember]         Sign in and save the session");
    eprintln!("  logout [--forget]                      Drop the session (and stored password)");
    eprintln!("  list <resource>                        Every row, including hidden ones");
    eprintln!("  get <resource> <id>");
    eprintln!("  create <resource> <file.json>");
    eprintln!("  update <resource> <id> <file.json>");
    eprintln!("  delete <resource> <id> [--hard]");
    eprintln!("  reorder-skills <id>...                 Set skill display order");
    eprintln!("  upload-image <resource> <id> <file>    projects, blogs, certifications or achievements");
    eprintln!("  upload-file <file> [--bucket B] [--folder F]");
    eprintln!("  delete-file <url> [--bucket B]");
    eprintln!("  messages                               Contact inbox");
    eprintln!("  mark-read <id>");
    eprintln!("  resume upload <file.pdf> | latest | delete <name>");
}

/// Turn a service result into a CLI error.
fn require<T>(result: FetchResult<T>) -> Result<T> {
    result.into_result().map_err(anyhow::Error::msg)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_json(path: &str) -> Result<Value> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path))
}

fn arg<'a>(args: &'a [String], index: usize, usage: &str) -> Result<&'a str> {
    match args.get(index) {
        Some(value) => Ok(value.as_str()),
        None => bail!("Usage: folio admin {}", usage),
    }
}

fn parse_resource(name: &str) -> Result<Resource> {
    name.parse().map_err(anyhow::Error::msg)
}

/// Backend acting as the signed-in admin.
fn admin_backend(ctx: &Context) -> Result<Arc<dyn Backend>> {
    let mut session = Session::new(ctx.config.cache_dir()?);
    if !session.load()? {
        bail!("Not signed in. Run `folio admin login` first.");
    }
    match session.token() {
        Some(token) => Ok(Arc::new(ctx.client.with_token(token.to_string()))),
        None => bail!("Session expired. Run `folio admin login` again."),
    }
}

/// Listing order used by the admin screens for each table.
fn admin_order(resource: Resource) -> Query {
    match resource {
        Resource::Skills => Query::new().order("category", true).order("display_order", true),
        Resource::Projects | Resource::Blogs => Query::new().order("created_at", false),
        Resource::Experience | Resource::Certifications | Resource::Achievements => {
            Query::new().order("display_order", true)
        }
    }
}

/// Tables whose rows are hidden rather than removed unless `--hard` is given.
fn soft_deletes(resource: Resource) -> bool {
    matches!(
        resource,
        Resource::Skills | Resource::Experience | Resource::Certifications | Resource::Achievements
    )
}

pub async fn run(ctx: &Context, args: &[String]) -> Result<()> {
    let Some(command) = args.first().map(String::as_str) else {
        print_usage();
        return Ok(());
    };
    let rest = &args[1..];

    match command {
        "login" => login(ctx, rest).await,
        "logout" => logout(ctx, rest),
        "list" => list(ctx, rest).await,
        "get" => get(ctx, rest).await,
        "create" => create(ctx, rest).await,
        "update" => update(ctx, rest).await,
        "delete" => delete(ctx, rest).await,
        "reorder-skills" => reorder_skills(ctx, rest).await,
        "upload-image" => upload_image(ctx, rest).await,
        "upload-file" => upload_file(ctx, rest).await,
        "delete-file" => delete_file(ctx, rest).await,
        "messages" => messages(ctx).await,
        "mark-read" => mark_read(ctx, rest).await,
        "resume" => resume(ctx, rest).await,
        "help" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown admin command '{}'", other)
        }
    }
}

// ============================================================================
// Session
// ============================================================================

fn prompt_email() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;

    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    Ok(email.trim().to_string())
}

async fn login(ctx: &Context, args: &[String]) -> Result<()> {
    let email = match flag_value(args, "--email").or_else(|| ctx.config.admin_email.clone()) {
        Some(email) => email,
        None => prompt_email()?,
    };
    if email.is_empty() {
        bail!("Email required");
    }

    let limiter = RateLimiter::login(Arc::clone(&ctx.store));
    if !limiter.check(&email) {
        bail!(
            "Too many login attempts. Please try again in {} minutes.",
            limiter.window().as_secs() / 60
        );
    }

    let password = match CredentialStore::get_password(&email) {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Password: ")?,
    };

    eprintln!("Signing in...");
    let session_data = ctx.client.sign_in(&email, &password).await?;
    limiter.reset(&email);

    if has_flag(args, "--remember") {
        if let Err(e) = CredentialStore::store(&email, &password) {
            warn!(error = %e, "Failed to store credentials");
        }
    }

    // Persist only the file's own settings, not environment overrides
    let mut config = Config::load_from(&Config::config_path()?)?;
    if config.admin_email.as_deref() != Some(email.as_str()) {
        config.admin_email = Some(email.clone());
        if let Err(e) = config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    let mut session = Session::new(ctx.config.cache_dir()?);
    session.update(session_data);
    session.save()?;

    if let Some(ref data) = session.data {
        println!(
            "Signed in as {} (session valid for {} minutes)",
            data.email,
            data.minutes_until_expiry()
        );
    }
    Ok(())
}

fn logout(ctx: &Context, args: &[String]) -> Result<()> {
    let mut session = Session::new(ctx.config.cache_dir()?);
    session.load()?;
    let email = session.email().map(str::to_string).or_else(|| ctx.config.admin_email.clone());
    session.clear()?;

    if has_flag(args, "--forget") {
        if let Some(email) = email {
            if let Err(e) = CredentialStore::delete(&email) {
                warn!(error = %e, "Failed to delete stored credentials");
            }
        }
    }

    println!("Signed out.");
    Ok(())
}

// ============================================================================
// Content tables
// ============================================================================

fn table(backend: Arc<dyn Backend>, resource: Resource) -> TableService<Value> {
    TableService::with_table(backend, resource.table())
}

/// Edits make the cached copy of the resource outdated.
fn invalidate(ctx: &Context, resource: Resource) {
    ctx.cache.remove(resource.key());
}

async fn list(ctx: &Context, args: &[String]) -> Result<()> {
    let resource = parse_resource(arg(args, 0, "list <resource>")?)?;
    let rows = require(table(admin_backend(ctx)?, resource).get_all(&admin_order(resource)).await)?;
    eprintln!("{} row(s) in {}", rows.len(), resource.table());
    print_json(&rows)
}

async fn get(ctx: &Context, args: &[String]) -> Result<()> {
    let usage = "get <resource> <id>";
    let resource = parse_resource(arg(args, 0, usage)?)?;
    let id = RecordId::from(arg(args, 1, usage)?);
    let row = require(table(admin_backend(ctx)?, resource).get_by_id(&id).await)?;
    print_json(&row)
}

async fn create(ctx: &Context, args: &[String]) -> Result<()> {
    let usage = "create <resource> <file.json>";
    let resource = parse_resource(arg(args, 0, usage)?)?;
    let record = read_json(arg(args, 1, usage)?)?;

    let row = require(table(admin_backend(ctx)?, resource).create(&record).await)?;
    invalidate(ctx, resource);
    print_json(&row)
}

async fn update(ctx: &Context, args: &[String]) -> Result<()> {
    let usage = "update <resource> <id> <file.json>";
    let resource = parse_resource(arg(args, 0, usage)?)?;
    let id = RecordId::from(arg(args, 1, usage)?);
    let patch = read_json(arg(args, 2, usage)?)?;

    let row = require(table(admin_backend(ctx)?, resource).update(&id, &patch).await)?;
    invalidate(ctx, resource);
    print_json(&row)
}

async fn delete(ctx: &Context, args: &[String]) -> Result<()> {
    let usage = "delete <resource> <id> [--hard]";
    let resource = parse_resource(arg(args, 0, usage)?)?;
    let id = RecordId::from(arg(args, 1, usage)?);
    let service = table(admin_backend(ctx)?, resource);

    if soft_deletes(resource) && !has_flag(args, "--hard") {
        require(service.soft_delete(&id).await)?;
        println!("Hid {} {} (use --hard to remove it)", resource.table(), id);
    } else {
        require(service.delete(&id).await)?;
        println!("Deleted {} {}", resource.table(), id);
    }
    invalidate(ctx, resource);
    Ok(())
}

async fn reorder_skills(ctx: &Context, args: &[String]) -> Result<()> {
    if args.is_empty() {
        bail!("Usage: folio admin reorder-skills <id>...");
    }
    let ids: Vec<RecordId> = args.iter().map(|a| RecordId::from(a.as_str())).collect();
    require(SkillsService::new(admin_backend(ctx)?).reorder(&ids).await)?;
    invalidate(ctx, Resource::Skills);
    println!("Reordered {} skill(s)", ids.len());
    Ok(())
}

async fn upload_image(ctx: &Context, args: &[String]) -> Result<()> {
    let usage = "upload-image <resource> <id> <file>";
    let resource = parse_resource(arg(args, 0, usage)?)?;
    let id = RecordId::from(arg(args, 1, usage)?);
    let file = UploadFile::from_path(Path::new(arg(args, 2, usage)?))?;
    if !is_valid_image(&file) {
        bail!("Please select an image file (JPEG, PNG, GIF or WebP)");
    }

    let backend = admin_backend(ctx)?;
    let url = match resource {
        Resource::Projects => ProjectService::new(backend).upload_image(&file, &id).await,
        Resource::Blogs => BlogService::new(backend).upload_image(&file, &id).await,
        Resource::Certifications => CertificationsService::new(backend).upload_image(&file, &id).await,
        // Achievement images are plain uploads; the row is not touched
        Resource::Achievements => {
            StorageService::new(backend)
                .upload_file(&file, IMAGES_BUCKET, Some("achievements"))
                .await
        }
        other => bail!("{} rows have no images", other),
    };
    println!("{}", require(url)?);
    Ok(())
}

async fn upload_file(ctx: &Context, args: &[String]) -> Result<()> {
    let file = UploadFile::from_path(Path::new(arg(args, 0, "upload-file <file> [--bucket B] [--folder F]")?))?;
    let bucket = flag_value(args, "--bucket").unwrap_or_else(|| IMAGES_BUCKET.to_string());
    let folder = flag_value(args, "--folder");

    let url = StorageService::new(admin_backend(ctx)?)
        .upload_file(&file, &bucket, folder.as_deref())
        .await;
    println!("{}", require(url)?);
    Ok(())
}

async fn delete_file(ctx: &Context, args: &[String]) -> Result<()> {
    let url = arg(args, 0, "delete-file <url> [--bucket B]")?;
    let bucket = flag_value(args, "--bucket").unwrap_or_else(|| IMAGES_BUCKET.to_string());

    require(StorageService::new(admin_backend(ctx)?).delete_file(url, &bucket).await)?;
    println!("Deleted {}", url);
    Ok(())
}

// ============================================================================
// Inbox
// ============================================================================

async fn messages(ctx: &Context) -> Result<()> {
    let service = ContactService::new(admin_backend(ctx)?);
    let messages = require(service.get_all().await)?;
    let unread = messages.iter().filter(|m| !m.is_read).count();

    println!("{} message(s), {} unread\n", messages.len(), unread);
    for m in &messages {
        let when = m.created_at.as_deref().map(format_timestamp).unwrap_or_default();
        println!(
            "{} [{}] {} <{}> {}",
            if m.is_read { " " } else { "*" },
            m.id,
            m.name,
            m.email,
            when
        );
        println!("    {}", m.subject);
        println!("    {}", truncate_text(&m.message, 100));
    }
    Ok(())
}

async fn mark_read(ctx: &Context, args: &[String]) -> Result<()> {
    let id = RecordId::from(arg(args, 0, "mark-read <id>")?);
    require(ContactService::new(admin_backend(ctx)?).mark_as_read(&id).await)?;
    println!("Marked message {} as read", id);
    Ok(())
}

// ============================================================================
// Resume
// ============================================================================

async fn resume(ctx: &Context, args: &[String]) -> Result<()> {
    let usage = "resume upload <file.pdf> | latest | delete <name>";
    let service = ResumeService::new(admin_backend(ctx)?);

    match arg(args, 0, usage)? {
        "upload" => {
            let file = UploadFile::from_path(Path::new(arg(args, 1, usage)?))?;
            println!("{}", require(service.upload(&file).await)?);
        }
        "latest" => println!("{}", require(service.latest().await)?),
        "delete" => {
            let name = arg(args, 1, usage)?;
            require(service.delete(name).await)?;
            println!("Deleted resume {}", name);
        }
        other => bail!("Unknown resume command '{}'", other),
    }
    Ok(())
}
