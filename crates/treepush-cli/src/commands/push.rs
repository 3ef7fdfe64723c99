//! `treepush push` command - Commit local files to a remote branch.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use serde::Serialize;
use treepush_core::config::{GitHubConfig, UploadConfig};
use treepush_core::{
    Config, FileAction, PendingChange, RepoId, RepoPath, UploadOutcome, UploadPlan,
    UploadRequest, UploadService,
};
use treepush_github::{Auth, GitHubClient};

use crate::output;

/// Arguments for `treepush push`.
#[derive(Debug, Args)]
pub struct PushArgs {
    /// GitHub access token (falls back to `GITHUB_TOKEN`, then `gh auth token`).
    #[arg(short, long, env = "TREEPUSH_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Target repository as <owner>/<name>.
    #[arg(short, long)]
    pub repository: Option<String>,

    /// Branch to commit on.
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Commit message.
    #[arg(short, long)]
    pub message: Option<String>,

    /// Directory that maps to the repository root.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// GitHub API URL (for GitHub Enterprise).
    #[arg(long)]
    pub api_url: Option<String>,

    /// Config file (default: ./treepush.toml if present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show what would be written without creating anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    /// Remember repository, branch, message and API URL in the config file.
    #[arg(long)]
    pub save_config: bool,

    /// Files to upload.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Settings after merging flags over the config file.
#[derive(Debug)]
struct Settings {
    repository: RepoId,
    branch: String,
    message: String,
    api_url: Option<String>,
}

impl Settings {
    fn resolve(args: &PushArgs, config: Config) -> Result<Self> {
        let repository = args
            .repository
            .clone()
            .or(config.github.repository)
            .context("No repository given - pass --repository <owner>/<name>")?
            .parse()?;
        let branch = args
            .branch
            .clone()
            .or(config.upload.branch)
            .context("No branch given - pass --branch <name>")?;
        let message = args
            .message
            .clone()
            .or(config.upload.message)
            .context("No commit message given - pass --message <text>")?;

        Ok(Self {
            repository,
            branch,
            message,
            api_url: args.api_url.clone().or(config.github.api_url),
        })
    }
}

impl From<&Settings> for Config {
    fn from(settings: &Settings) -> Self {
        Self {
            github: GitHubConfig {
                api_url: settings.api_url.clone(),
                repository: Some(settings.repository.to_string()),
            },
            upload: UploadConfig {
                branch: Some(settings.branch.clone()),
                message: Some(settings.message.clone()),
            },
        }
    }
}

/// JSON output for push command.
#[derive(Debug, Serialize)]
struct PushOutput {
    repository: String,
    branch: String,
    parent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<String>,
    files: Vec<FileOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trees_created: Option<usize>,
    dry_run: bool,
}

/// Information about a pushed file (for JSON output).
#[derive(Debug, Serialize)]
struct FileOutput {
    path: String,
    action: FileAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

/// Run the push command.
pub fn run(args: &PushArgs) -> Result<()> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(Config::FILE_NAME));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    let settings = Settings::resolve(args, config)?;

    let changes = read_changes(&args.files, &args.root)?;

    let auth = Auth::from_key(args.key.clone());
    let client = match &settings.api_url {
        Some(url) => GitHubClient::with_base_url(&auth, url.as_str()),
        None => GitHubClient::new(&auth),
    }
    .context("Failed to authenticate with GitHub")?;
    let rt = tokio::runtime::Runtime::new()?;

    let service = UploadService::new(&client, &settings.repository);
    let request = UploadRequest {
        branch: settings.branch.clone(),
        message: settings.message.clone(),
        changes,
    };

    if !args.json {
        output::info(&format!(
            "Pushing {} file(s) to {} ({})...",
            request.changes.len(),
            settings.repository,
            settings.branch
        ));
    }

    // Phase 1: read-only, resolves the branch and indexes the touched directories
    let plan = rt
        .block_on(service.create_plan(&request))
        .context("Failed to read the remote tree")?;

    // The branch resolved, so the settings are worth keeping
    if args.save_config {
        Config::from(&settings)
            .save(&config_path)
            .with_context(|| format!("Failed to save config to {}", config_path.display()))?;
        if !args.json {
            output::info(&format!("Saved settings to {}", config_path.display()));
        }
    }

    if args.dry_run {
        return print_plan(&settings, &plan, args.json);
    }

    // Phase 2: create blobs, trees and the commit, then fast-forward the branch
    let outcome = rt
        .block_on(service.execute(plan, &request))
        .context("Upload failed - the branch was not changed")?;

    print_outcome(&settings, &outcome, args.json)
}

/// Read every file and map it to its repository path under `root`.
fn read_changes(files: &[PathBuf], root: &Path) -> Result<Vec<PendingChange>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Cannot access root directory {}", root.display()))?;

    let mut seen = HashSet::new();
    let mut changes = Vec::with_capacity(files.len());

    for file in files {
        let absolute = file
            .canonicalize()
            .with_context(|| format!("Cannot access {}", file.display()))?;
        if absolute.is_dir() {
            bail!("{} is a directory - list the files to upload", file.display());
        }

        let relative = absolute.strip_prefix(&root).map_err(|_| {
            anyhow!(
                "{} is outside the root directory {}",
                file.display(),
                root.display()
            )
        })?;
        let relative = relative
            .to_str()
            .with_context(|| format!("{} is not a valid UTF-8 path", file.display()))?;
        let path = RepoPath::new(relative)?;

        if !seen.insert(path.clone()) {
            output::warn(&format!("{path} listed more than once - the last copy wins"));
        }

        let bytes =
            fs::read(&absolute).with_context(|| format!("Failed to read {}", file.display()))?;
        tracing::debug!(path = %path, bytes = bytes.len(), "read local file");
        changes.push(PendingChange::from_bytes(path, bytes)?);
    }

    Ok(changes)
}

fn print_plan(settings: &Settings, plan: &UploadPlan, json: bool) -> Result<()> {
    if json {
        let out = PushOutput {
            repository: settings.repository.to_string(),
            branch: settings.branch.clone(),
            parent: plan.head.clone(),
            commit: None,
            root: None,
            files: plan
                .files
                .iter()
                .map(|f| FileOutput {
                    path: f.path.clone(),
                    action: f.action,
                    sha: None,
                })
                .collect(),
            trees_created: None,
            dry_run: true,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    output::info(&format!(
        "Dry run - would commit on top of {}:",
        output::short_sha(&plan.head)
    ));
    for file in &plan.files {
        output::detail(&format!("  {:<8} {}", output::file_action(file.action), file.path));
    }
    Ok(())
}

fn print_outcome(settings: &Settings, outcome: &UploadOutcome, json: bool) -> Result<()> {
    if json {
        let out = PushOutput {
            repository: settings.repository.to_string(),
            branch: outcome.branch.clone(),
            parent: outcome.parent.clone(),
            commit: Some(outcome.commit.clone()),
            root: Some(outcome.root.clone()),
            files: outcome
                .files
                .iter()
                .map(|f| FileOutput {
                    path: f.path.clone(),
                    action: f.action,
                    sha: Some(f.sha.clone()),
                })
                .collect(),
            trees_created: Some(outcome.trees_created),
            dry_run: false,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for file in &outcome.files {
        output::success(&format!(
            "  {} ({})",
            file.path,
            output::file_action(file.action)
        ));
    }
    output::success(&format!(
        "Committed {} to {} (parent {})",
        output::short_sha(&outcome.commit),
        outcome.branch,
        output::short_sha(&outcome.parent)
    ));
    output::essential(&outcome.commit);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(files: Vec<PathBuf>, root: PathBuf) -> PushArgs {
        PushArgs {
            key: Some("test-token".into()),
            repository: Some("owner/repo".into()),
            branch: Some("main".into()),
            message: Some("Update".into()),
            root,
            api_url: None,
            config: None,
            dry_run: false,
            json: false,
            save_config: false,
            files,
        }
    }

    #[test]
    fn test_settings_flags_override_config() {
        let config = Config {
            github: GitHubConfig {
                api_url: Some("https://ghe.example.com/api/v3".into()),
                repository: Some("other/repo".into()),
            },
            upload: UploadConfig {
                branch: Some("gh-pages".into()),
                message: Some("From config".into()),
            },
        };
        let settings = Settings::resolve(&args(vec![], ".".into()), config).unwrap();

        assert_eq!(settings.repository.to_string(), "owner/repo");
        assert_eq!(settings.branch, "main");
        assert_eq!(settings.message, "Update");
        assert_eq!(
            settings.api_url.as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
    }

    #[test]
    fn test_settings_fall_back_to_config() {
        let mut bare = args(vec![], ".".into());
        bare.repository = None;
        bare.branch = None;
        bare.message = None;
        let config = Config {
            github: GitHubConfig {
                api_url: None,
                repository: Some("co3k/site".into()),
            },
            upload: UploadConfig {
                branch: Some("gh-pages".into()),
                message: Some("Publish".into()),
            },
        };

        let settings = Settings::resolve(&bare, config).unwrap();
        assert_eq!(settings.repository.name, "site");
        assert_eq!(settings.branch, "gh-pages");
        assert_eq!(settings.message, "Publish");
    }

    #[test]
    fn test_saved_settings_load_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(Config::FILE_NAME);
        let mut flags = args(vec![], ".".into());
        flags.api_url = Some("https://ghe.example.com/api/v3".into());
        let settings = Settings::resolve(&flags, Config::default()).unwrap();

        Config::from(&settings).save(&path).unwrap();

        let mut bare = args(vec![], ".".into());
        bare.repository = None;
        bare.branch = None;
        bare.message = None;
        let reloaded = Settings::resolve(&bare, Config::load(&path).unwrap()).unwrap();
        assert_eq!(reloaded.repository, settings.repository);
        assert_eq!(reloaded.branch, "main");
        assert_eq!(reloaded.message, "Update");
        assert_eq!(reloaded.api_url, settings.api_url);
    }

    #[test]
    fn test_settings_require_branch() {
        let mut bare = args(vec![], ".".into());
        bare.branch = None;

        let err = Settings::resolve(&bare, Config::default()).unwrap_err();
        assert!(err.to_string().contains("--branch"));
    }

    #[test]
    fn test_read_changes_maps_paths_under_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("docs/guide")).unwrap();
        fs::write(temp.path().join("docs/guide/intro.md"), "# Intro\n").unwrap();
        fs::write(temp.path().join("top.md"), "top").unwrap();

        let changes = read_changes(
            &[
                temp.path().join("docs/guide/intro.md"),
                temp.path().join("top.md"),
            ],
            temp.path(),
        )
        .unwrap();

        assert_eq!(changes[0].path().as_str(), "docs/guide/intro.md");
        assert_eq!(changes[0].content(), "# Intro\n");
        assert_eq!(changes[1].path().as_str(), "top.md");
    }

    #[test]
    fn test_read_changes_rejects_outside_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("site");
        fs::create_dir_all(&root).unwrap();
        fs::write(temp.path().join("secret.txt"), "x").unwrap();

        let err = read_changes(&[temp.path().join("secret.txt")], &root).unwrap_err();
        assert!(err.to_string().contains("outside the root directory"));
    }

    #[test]
    fn test_read_changes_rejects_directories_and_binary() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("docs")).unwrap();
        fs::write(temp.path().join("logo.png"), [0x89, 0x50, 0x4e, 0x47, 0xff]).unwrap();

        assert!(read_changes(&[temp.path().join("docs")], temp.path()).is_err());
        let err = read_changes(&[temp.path().join("logo.png")], temp.path()).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }
}
