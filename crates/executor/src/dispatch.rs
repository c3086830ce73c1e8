// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The command dispatch table: one `Dispatcher` per Daemon process, owning
//! every mutable subsystem a `command` frame's handler might touch.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use elegantmc_backup::{BackupOutcome, BackupRequest, Format as BackupFormat};
use elegantmc_core::{Clock, InstanceId};
use elegantmc_frp::{ProxyConfig, Supervisor as FrpSupervisor};
use elegantmc_fs::download::{download, ExpectedHashes};
use elegantmc_fs::sandbox::Sandbox;
use elegantmc_fs::{trash, DuCache, UploadManager};
use elegantmc_mc::{required_java_major, StartArgs, Supervisor as McSupervisor};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ExecutorError;
use crate::installers::{self, InstallUrls};
use crate::net;
use crate::result::CommandResult;
use crate::schedule::{self, ScheduleTask, TaskType};
use crate::validation;

/// Callback for long-operation progress lines: `(instance_id, human line)`.
/// The caller wraps these into `log` frames with source `install`.
pub type LogSink = Arc<dyn Fn(&str, &str) + Send + Sync>;

pub struct Dispatcher {
    sandbox: Sandbox,
    mc: Arc<McSupervisor>,
    frp: Arc<FrpSupervisor>,
    uploads: UploadManager,
    du_cache: DuCache,
    http: reqwest::Client,
    clock: Arc<dyn Clock>,
    install_urls: InstallUrls,
    log_sink: LogSink,
}

impl Dispatcher {
    pub fn new(
        sandbox: Sandbox,
        mc: Arc<McSupervisor>,
        frp: Arc<FrpSupervisor>,
        clock: Arc<dyn Clock>,
        install_urls: InstallUrls,
        log_sink: LogSink,
    ) -> Self {
        Self {
            sandbox,
            mc,
            frp,
            uploads: UploadManager::new(),
            du_cache: DuCache::new(),
            http: reqwest::Client::new(),
            clock,
            install_urls,
            log_sink,
        }
    }

    /// Dispatches one `command` frame's `name`/`args` and always resolves
    /// to a `CommandResult`; nothing here propagates a panic or an error
    /// past this boundary.
    pub async fn dispatch(&self, name: &str, args: Value) -> CommandResult {
        CommandResult::from_result(self.dispatch_inner(name, args).await)
    }

    async fn dispatch_inner(&self, name: &str, args: Value) -> Result<Value, ExecutorError> {
        match name {
            "ping" => Ok(json!({ "pong": true })),

            "fs_read" => self.fs_read(args).await,
            "fs_write" => self.fs_write(args).await,
            "fs_list" => self.fs_list(args).await,
            "fs_stat" => self.fs_stat(args).await,
            "fs_du" => self.fs_du(args).await,
            "fs_delete" => self.fs_delete(args).await,
            "fs_mkdir" => self.fs_mkdir(args).await,
            "fs_move" => self.fs_move(args).await,
            "fs_copy" => self.fs_copy(args).await,
            "fs_zip" => self.fs_zip(args).await,
            "fs_unzip" => self.fs_unzip(args).await,
            "fs_trash" => self.fs_trash(args).await,
            "fs_trash_restore" => self.fs_trash_restore(args).await,
            "fs_trash_list" => self.fs_trash_list().await,
            "fs_trash_delete" => self.fs_trash_delete(args).await,

            "fs_upload_begin" => self.fs_upload_begin(args).await,
            "fs_upload_chunk" => self.fs_upload_chunk(args).await,
            "fs_upload_commit" => self.fs_upload_commit(args).await,
            "fs_upload_abort" => self.fs_upload_abort(args).await,
            "fs_download" => self.fs_download(args).await,

            "mc_install_vanilla" => self.mc_install_vanilla(args).await,
            "mc_install_paper" => self.mc_install_paper(args).await,
            "mc_start" => self.mc_start(args).await,
            "mc_stop" => self.mc_stop(args).await,
            "mc_restart" => self.mc_restart(args).await,
            "mc_delete" => self.mc_delete(args).await,
            "mc_console" => self.mc_console(args).await,
            "mc_templates" => self.mc_templates(),
            "mc_detect_jar" => self.mc_detect_jar(args).await,
            "mc_required_java" => self.mc_required_java(args).await,
            "mc_backup" => self.mc_backup(args).await,
            "mc_backup_prune" => self.mc_backup_prune(args).await,
            "mc_restore" => self.mc_restore(args).await,

            "frp_start" => self.frp_start(args).await,
            "frp_stop" => self.frp_stop(args).await,
            "frpc_install" => self.frpc_install(args).await,

            "schedule_get" => self.schedule_get().await,
            "schedule_set" => self.schedule_set(args).await,
            "schedule_run_task" => self.schedule_run_task(args).await,

            "net_check_port" => self.net_check_port(args).await,
            "diagnostics_bundle" => self.diagnostics_bundle().await,

            other => Err(ExecutorError::UnknownCommand(other.to_string())),
        }
    }

    fn instance_dir(&self, id: &InstanceId) -> Result<PathBuf, ExecutorError> {
        Ok(self.sandbox.resolve(&format!("servers/{id}"))?)
    }

    fn emit_progress(&self, instance_id: &str, line: impl AsRef<str>) {
        (self.log_sink)(instance_id, line.as_ref());
    }

    // -- fs_* -----------------------------------------------------------

    async fn fs_read(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            path: String,
        }
        let args: Args = parse(args)?;
        let bytes = self.sandbox.read(&args.path).await?;
        let content_b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(json!({ "content_b64": content_b64 }))
    }

    async fn fs_write(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            path: String,
            content_b64: String,
        }
        let args: Args = parse(args)?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(&args.content_b64)
            .map_err(|e| ExecutorError::Validation(format!("invalid content_b64: {e}")))?;
        self.sandbox.write(&args.path, &data).await?;
        Ok(json!({}))
    }

    async fn fs_list(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            path: String,
        }
        let args: Args = parse(args)?;
        let entries = self.sandbox.list(&args.path).await?;
        Ok(serde_json::to_value(entries)?)
    }

    async fn fs_stat(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            path: String,
        }
        let args: Args = parse(args)?;
        let stat = self.sandbox.stat(&args.path).await?;
        Ok(serde_json::to_value(stat)?)
    }

    async fn fs_du(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            path: String,
            #[serde(default)]
            entry_cap: Option<usize>,
            #[serde(default)]
            ttl_secs: Option<u64>,
            #[serde(default)]
            force: bool,
        }
        let args: Args = parse(args)?;
        let ttl = args.ttl_secs.map(Duration::from_secs);
        let result = self
            .du_cache
            .du(&self.sandbox, &args.path, args.entry_cap, ttl, args.force)
            .await?;
        Ok(serde_json::to_value(result)?)
    }

    async fn fs_delete(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            path: String,
        }
        let args: Args = parse(args)?;
        self.sandbox.delete(&args.path).await?;
        Ok(json!({}))
    }

    async fn fs_mkdir(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            path: String,
        }
        let args: Args = parse(args)?;
        self.sandbox.mkdir(&args.path).await?;
        Ok(json!({}))
    }

    async fn fs_move(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            from: String,
            to: String,
        }
        let args: Args = parse(args)?;
        self.sandbox.move_path(&args.from, &args.to).await?;
        Ok(json!({}))
    }

    async fn fs_copy(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            from: String,
            to: String,
        }
        let args: Args = parse(args)?;
        self.sandbox.copy_path(&args.from, &args.to).await?;
        Ok(json!({}))
    }

    async fn fs_zip(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            src: String,
            dest: String,
        }
        let args: Args = parse(args)?;
        let src_abs = self.sandbox.resolve(&args.src)?;
        let dest_abs = self.sandbox.resolve_non_root(&args.dest)?;
        tokio::task::spawn_blocking(move || elegantmc_fs::archive::zip_dir(&src_abs, &dest_abs))
            .await
            .map_err(|e| ExecutorError::Validation(format!("zip task panicked: {e}")))??;
        Ok(json!({}))
    }

    async fn fs_unzip(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            src: String,
            dest: String,
        }
        let args: Args = parse(args)?;
        let src_abs = self.sandbox.resolve(&args.src)?;
        let dest_abs = self.sandbox.resolve_non_root(&args.dest)?;
        tokio::task::spawn_blocking(move || elegantmc_fs::archive::unzip(&src_abs, &dest_abs))
            .await
            .map_err(|e| ExecutorError::Validation(format!("unzip task panicked: {e}")))??;
        Ok(json!({}))
    }

    async fn fs_trash(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            path: String,
        }
        let args: Args = parse(args)?;
        let entry = trash::trash(&self.sandbox, &args.path, self.clock.now_unix()).await?;
        Ok(serde_json::to_value(entry)?)
    }

    async fn fs_trash_restore(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            trash_id: String,
        }
        let args: Args = parse(args)?;
        trash::restore(&self.sandbox, &args.trash_id).await?;
        Ok(json!({}))
    }

    async fn fs_trash_list(&self) -> Result<Value, ExecutorError> {
        let entries = trash::list(&self.sandbox).await?;
        Ok(serde_json::to_value(entries)?)
    }

    async fn fs_trash_delete(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            trash_id: String,
        }
        let args: Args = parse(args)?;
        trash::delete(&self.sandbox, &args.trash_id).await?;
        Ok(json!({}))
    }

    // -- fs_upload_* / fs_download ---------------------------------------

    async fn fs_upload_begin(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            path: String,
        }
        let args: Args = parse(args)?;
        let id = self
            .uploads
            .begin(&self.sandbox, &args.path, self.clock.now_unix())
            .await?;
        Ok(json!({ "upload_id": id }))
    }

    async fn fs_upload_chunk(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            upload_id: String,
            data_b64: String,
        }
        let args: Args = parse(args)?;
        self.uploads
            .chunk(&args.upload_id, &args.data_b64, self.clock.now_unix())
            .await?;
        Ok(json!({}))
    }

    async fn fs_upload_commit(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            upload_id: String,
            #[serde(default)]
            sha256: Option<String>,
        }
        let args: Args = parse(args)?;
        let outcome = self
            .uploads
            .commit(&args.upload_id, args.sha256.as_deref())
            .await?;
        Ok(serde_json::to_value(outcome)?)
    }

    async fn fs_upload_abort(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            upload_id: String,
        }
        let args: Args = parse(args)?;
        self.uploads.abort(&args.upload_id).await?;
        Ok(json!({}))
    }

    async fn fs_download(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            url: String,
            dest: String,
            #[serde(default)]
            sha1: Option<String>,
            #[serde(default)]
            sha256: Option<String>,
        }
        let args: Args = parse(args)?;
        let dest_abs = self.sandbox.resolve_non_root(&args.dest)?;
        let expected = ExpectedHashes {
            sha1: args.sha1,
            sha256: args.sha256,
        };
        let dest_label = args.dest.clone();
        let sink = self.log_sink.clone();
        download(&self.http, &args.url, &dest_abs, &expected, move |p| {
            let pct = p
                .total_bytes
                .map(|total| format!("{}%", (p.bytes_so_far * 100 / total.max(1))))
                .unwrap_or_else(|| format!("{} bytes", p.bytes_so_far));
            sink(&dest_label, &format!("downloading {dest_label}: {pct}"));
        })
        .await?;
        Ok(json!({ "path": args.dest }))
    }

    // -- mc_* -------------------------------------------------------------

    async fn mc_install_vanilla(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            version: String,
            instance_id: String,
            #[serde(default)]
            jar_name: Option<String>,
            #[serde(default)]
            accept_eula: bool,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        let jar_name = match &args.jar_name {
            Some(name) => validation::jar_name(name)?,
            None => "server.jar",
        };
        let instance_dir = self.instance_dir(&id)?;
        tokio::fs::create_dir_all(&instance_dir).await?;

        self.emit_progress(id.as_str(), format!("resolving Vanilla {}", args.version));
        let resolved = installers::resolve_vanilla(&self.http, &self.install_urls, &args.version).await?;

        let sink = self.log_sink.clone();
        let instance_label = id.as_str().to_string();
        installers::fetch_jar(&self.http, &resolved, &instance_dir, jar_name, move |p| {
            sink(&instance_label, &format!("downloading server.jar: {} bytes", p.bytes_so_far));
        })
        .await?;

        if args.accept_eula {
            installers::accept_eula(&instance_dir).await?;
        }
        self.emit_progress(id.as_str(), "Vanilla install complete");

        Ok(json!({ "jar_name": jar_name, "sha1": resolved.sha1 }))
    }

    async fn mc_install_paper(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            version: String,
            instance_id: String,
            #[serde(default)]
            build: Option<u32>,
            #[serde(default)]
            jar_name: Option<String>,
            #[serde(default)]
            accept_eula: bool,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        let instance_dir = self.instance_dir(&id)?;
        tokio::fs::create_dir_all(&instance_dir).await?;

        self.emit_progress(id.as_str(), format!("resolving Paper {}", args.version));
        let resolved =
            installers::resolve_paper(&self.http, &self.install_urls, &args.version, args.build).await?;
        let jar_name = match &args.jar_name {
            Some(name) => validation::jar_name(name)?.to_string(),
            None => resolved.default_filename.clone(),
        };

        let sink = self.log_sink.clone();
        let instance_label = id.as_str().to_string();
        let jar_name_for_log = jar_name.clone();
        installers::fetch_jar(&self.http, &resolved, &instance_dir, &jar_name, move |p| {
            sink(
                &instance_label,
                &format!("downloading {jar_name_for_log}: {} bytes", p.bytes_so_far),
            );
        })
        .await?;

        if args.accept_eula {
            installers::accept_eula(&instance_dir).await?;
        }
        self.emit_progress(id.as_str(), "Paper install complete");

        Ok(json!({ "jar_name": jar_name, "sha256": resolved.sha256 }))
    }

    async fn mc_start(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            instance_id: String,
            jar_path: String,
            #[serde(default)]
            java_path: Option<String>,
            #[serde(default)]
            xms: Option<String>,
            #[serde(default)]
            xmx: Option<String>,
            #[serde(default)]
            jvm_args: Vec<String>,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        let jar_name = validation::jar_name(&args.jar_path)?;
        let instance_dir = self.instance_dir(&id)?;
        let start_args = StartArgs {
            jar_path: PathBuf::from(jar_name),
            java_path: args.java_path,
            xms: args.xms,
            xmx: args.xmx,
            jvm_args: args.jvm_args,
        };
        let state = self.mc.start(&id, instance_dir, start_args).await?;
        Ok(serde_json::to_value(state)?)
    }

    async fn mc_stop(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            instance_id: String,
            #[serde(default)]
            graceful_timeout_secs: Option<u64>,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        self.mc
            .stop(&id, args.graceful_timeout_secs.map(Duration::from_secs))
            .await?;
        Ok(json!({}))
    }

    async fn mc_restart(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            instance_id: String,
            #[serde(default)]
            graceful_timeout_secs: Option<u64>,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        let state = self
            .mc
            .restart(&id, args.graceful_timeout_secs.map(Duration::from_secs))
            .await?;
        Ok(serde_json::to_value(state)?)
    }

    async fn mc_delete(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            instance_id: String,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        self.mc.delete(&id).await;
        self.sandbox.delete(&format!("servers/{id}")).await?;
        Ok(json!({}))
    }

    async fn mc_console(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            instance_id: String,
            line: String,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        self.mc.console(&id, &args.line).await?;
        Ok(json!({}))
    }

    fn mc_templates(&self) -> Result<Value, ExecutorError> {
        Ok(json!([
            { "id": "vanilla", "label": "Vanilla" },
            { "id": "paper", "label": "Paper" },
        ]))
    }

    async fn mc_detect_jar(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            instance_id: String,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        let instance_dir = self.instance_dir(&id)?;

        let mut candidates = Vec::new();
        let mut read_dir = tokio::fs::read_dir(&instance_dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".jar") {
                candidates.push(name);
            }
        }
        candidates.sort();
        Ok(json!({ "jar_name": candidates.first() }))
    }

    async fn mc_required_java(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            instance_id: String,
            jar_name: String,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        let jar_name = validation::jar_name(&args.jar_name)?;
        let instance_dir = self.instance_dir(&id)?;
        let jar_abs = instance_dir.join(jar_name);
        let required = tokio::task::spawn_blocking(move || required_java_major(&jar_abs))
            .await
            .map_err(|e| ExecutorError::Validation(format!("jar inspection task panicked: {e}")))??;
        Ok(json!({ "required_java_major": required }))
    }

    async fn mc_backup(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            instance_id: String,
            #[serde(default)]
            format: Option<String>,
            #[serde(default)]
            backup_name: Option<String>,
            #[serde(default)]
            comment: Option<String>,
            #[serde(default)]
            stop: bool,
            #[serde(default)]
            keep_last: Option<usize>,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        let format = match args.format.as_deref() {
            Some("tar.gz") => BackupFormat::TarGz,
            _ => BackupFormat::Zip,
        };
        let req = BackupRequest {
            instance_id: id.as_str().to_string(),
            format,
            backup_name: args.backup_name,
            comment: args.comment,
            stop: args.stop,
            keep_last: args.keep_last,
        };

        let mc = Arc::clone(&self.mc);
        let stop_id = id.clone();
        let sink = self.log_sink.clone();
        let instance_label = id.as_str().to_string();
        let BackupOutcome {
            meta,
            archive_rel,
            pruned,
        } = elegantmc_backup::create_backup(
            &self.sandbox,
            &self.clock,
            &req,
            || async move {
                let _ = mc.stop(&stop_id, None).await;
            },
            move |p| {
                sink(
                    &instance_label,
                    &format!("backing up: {} files, {} bytes", p.files_done, p.bytes_done),
                );
            },
        )
        .await?;

        Ok(json!({ "meta": meta, "archive_path": archive_rel, "pruned": pruned }))
    }

    async fn mc_backup_prune(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            instance_id: String,
            keep_last: usize,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        let backups_dir = self.sandbox.resolve(&format!("_backups/{id}"))?;
        let pruned = elegantmc_backup::prune_keep_last(&backups_dir, args.keep_last)?;
        Ok(json!({ "pruned": pruned }))
    }

    async fn mc_restore(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            instance_id: String,
            zip_path: String,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        let mc = Arc::clone(&self.mc);
        let stop_id = id.clone();
        elegantmc_backup::restore(&self.sandbox, id.as_str(), &args.zip_path, || async move {
            let _ = mc.stop(&stop_id, None).await;
        })
        .await?;
        Ok(json!({}))
    }

    // -- frp_* -------------------------------------------------------------

    async fn frp_start(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            instance_id: String,
            server_addr: String,
            server_port: u16,
            #[serde(default)]
            token: Option<String>,
            #[serde(default)]
            local_ip: Option<String>,
            local_port: u16,
            #[serde(default)]
            remote_port: u16,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        let workdir = self.sandbox.resolve_non_root(&format!("frp/{id}"))?;
        let cfg = ProxyConfig {
            name: id.as_str().to_string(),
            server_addr: args.server_addr,
            server_port: args.server_port,
            token: args.token,
            local_ip: args.local_ip,
            local_port: args.local_port,
            remote_port: args.remote_port,
        };
        let state = self.frp.start(&id, workdir, cfg).await?;
        Ok(serde_json::to_value(state)?)
    }

    async fn frp_stop(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            instance_id: String,
        }
        let args: Args = parse(args)?;
        let id = validation::instance_id(&args.instance_id)?;
        self.frp.stop(&id).await?;
        Ok(json!({}))
    }

    async fn frpc_install(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            url: String,
            sha256: String,
        }
        let args: Args = parse(args)?;
        let sha256 = validation::sha256_hex(&args.sha256)?;
        let dest_abs = self.sandbox.resolve_non_root("bin/frpc")?;
        if let Some(parent) = dest_abs.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let expected = ExpectedHashes {
            sha1: None,
            sha256: Some(sha256.to_string()),
        };
        let sink = self.log_sink.clone();
        download(&self.http, &args.url, &dest_abs, &expected, move |p| {
            sink("frpc", &format!("installing frpc: {} bytes", p.bytes_so_far));
        })
        .await?;
        set_executable(&dest_abs).await?;
        Ok(json!({}))
    }

    // -- schedule_* ---------------------------------------------------------

    async fn schedule_get(&self) -> Result<Value, ExecutorError> {
        let tasks = schedule::load(&self.sandbox).await?;
        Ok(serde_json::to_value(tasks)?)
    }

    async fn schedule_set(&self, args: Value) -> Result<Value, ExecutorError> {
        let tasks: Vec<ScheduleTask> = parse(args)?;
        for task in &tasks {
            if let Some(keep_last) = task.keep_last {
                elegantmc_backup::validate_keep_last(keep_last)?;
            }
            validation::instance_id(&task.instance_id)?;
        }
        schedule::save(&self.sandbox, &tasks).await?;
        Ok(json!({}))
    }

    async fn schedule_run_task(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            id: String,
        }
        let args: Args = parse(args)?;
        let mut tasks = schedule::load(&self.sandbox).await?;
        let index = tasks
            .iter()
            .position(|t| t.id == args.id)
            .ok_or_else(|| ExecutorError::UnknownTask(args.id.clone()))?;

        let now = self.clock.now_unix();
        let outcome = self.run_one_task(&tasks[index]).await;
        match &outcome {
            Ok(_) => {
                tasks[index].last_run_unix = Some(now);
                tasks[index].last_error = None;
            }
            Err(e) => {
                tasks[index].last_run_unix = Some(now);
                tasks[index].last_error = Some(e.to_string());
            }
        }
        schedule::save(&self.sandbox, &tasks).await?;
        outcome
    }

    async fn run_one_task(&self, task: &ScheduleTask) -> Result<Value, ExecutorError> {
        let id = validation::instance_id(&task.instance_id)?;
        match task.task_type {
            TaskType::Restart => {
                let state = self.mc.restart(&id, None).await?;
                Ok(serde_json::to_value(state)?)
            }
            TaskType::Stop => {
                self.mc.stop(&id, None).await?;
                Ok(json!({}))
            }
            TaskType::Backup => {
                let req = BackupRequest {
                    instance_id: id.as_str().to_string(),
                    format: BackupFormat::Zip,
                    backup_name: None,
                    comment: Some(format!("scheduled task {}", task.id)),
                    stop: false,
                    keep_last: task.keep_last,
                };
                let outcome = elegantmc_backup::create_backup(
                    &self.sandbox,
                    &self.clock,
                    &req,
                    || async {},
                    |_| {},
                )
                .await?;
                Ok(json!({ "archive_path": outcome.archive_rel }))
            }
            TaskType::Announce => {
                let message = task.message.clone().unwrap_or_default();
                self.mc.console(&id, &format!("say {message}")).await?;
                Ok(json!({}))
            }
            TaskType::PruneLogs => {
                let logs_dir = self.instance_dir(&id)?.join("logs");
                let removed = prune_old_logs(&logs_dir, task.keep_last.unwrap_or(5)).await?;
                Ok(json!({ "removed": removed }))
            }
        }
    }

    // -- diagnostics / net ----------------------------------------------

    async fn net_check_port(&self, args: Value) -> Result<Value, ExecutorError> {
        #[derive(Deserialize)]
        struct Args {
            host: String,
            port: u16,
        }
        let args: Args = parse(args)?;
        let result = net::check_port(&args.host, args.port).await;
        Ok(serde_json::to_value(result)?)
    }

    async fn diagnostics_bundle(&self) -> Result<Value, ExecutorError> {
        let mc_instances: Vec<(InstanceId, _)> = self.mc.snapshot().into_iter().collect();
        let frp_proxies: Vec<(InstanceId, _)> = self.frp.snapshot().into_iter().collect();
        let schedule_tasks = schedule::load(&self.sandbox).await?;

        let bundle = tokio::time::timeout(
            elegantmc_adapters::subprocess::DIAGNOSTICS_BUNDLE_TIMEOUT,
            async {
                crate::diagnostics::build(
                    self.clock.now_unix(),
                    self.sandbox.root(),
                    mc_instances,
                    frp_proxies,
                    schedule_tasks.len(),
                )
            },
        )
        .await
        .map_err(|_| ExecutorError::Validation("diagnostics_bundle timed out".to_string()))?;

        Ok(serde_json::to_value(bundle)?)
    }
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ExecutorError> {
    serde_json::from_value(args).map_err(ExecutorError::from)
}

#[cfg(unix)]
async fn set_executable(path: &std::path::Path) -> Result<(), ExecutorError> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o755);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn set_executable(_path: &std::path::Path) -> Result<(), ExecutorError> {
    Ok(())
}

/// Deletes the oldest log files under `logs_dir` beyond the newest
/// `keep_last`, by modification time. Missing directory prunes nothing.
async fn prune_old_logs(logs_dir: &std::path::Path, keep_last: usize) -> Result<Vec<String>, ExecutorError> {
    let mut entries = match tokio::fs::read_dir(logs_dir).await {
        Ok(read_dir) => {
            let mut read_dir = read_dir;
            let mut out = Vec::new();
            while let Some(entry) = read_dir.next_entry().await? {
                if entry.file_type().await?.is_file() {
                    let modified = entry.metadata().await?.modified().ok();
                    out.push((entry.path(), modified));
                }
            }
            out
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    entries.sort_by(|a, b| b.1.cmp(&a.1));
    let mut removed = Vec::new();
    for (path, _) in entries.into_iter().skip(keep_last) {
        tokio::fs::remove_file(&path).await?;
        removed.push(path.file_name().unwrap_or_default().to_string_lossy().into_owned());
    }
    Ok(removed)
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
