// One method per logical backend action.

mod candidates;
mod compose;
mod transcript;

use std::sync::Arc;

use crate::command::normalized_arguments;
use crate::config::Config;
use crate::dispatch::{
    CandidateList, CandidateStream, ExitCheck, FallbackPolicy, docker_compatible_candidates,
    run_candidates, run_first_successful, stream_candidates, stream_first_successful,
};
use crate::error::{EngineError, Result};
use crate::output::{decode_object, decode_records};
use crate::process::{CommandRunner, ExecutionResult, Executor, Invocation};
use crate::records::{BuilderStatusRecord, ContainerRecord, ImageRecord, SystemStatusRecord};

pub use compose::ComposeProject;
pub use transcript::render_transcript;

/// Facade over a container backend.
///
/// Every call is independent: it builds its own candidate list, spawns its
/// own processes and holds no state afterwards. Calls block the current
/// thread until the backend exits (streams block only in `next`), and the
/// engine is `Send + Sync`, so cloning it onto worker threads is the way to
/// run several operations at once.
pub struct ContainerEngine<R: CommandRunner + ?Sized = Executor> {
    runner: Arc<R>,
}

impl<R: CommandRunner + ?Sized> Clone for ContainerEngine<R> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
        }
    }
}

impl ContainerEngine<Executor> {
    /// An engine for `program`, found on `PATH` or the usual install dirs.
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_runner(Executor::new(program))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_runner(Executor::from_config(config))
    }

    pub fn program(&self) -> &str {
        self.runner.program()
    }
}

impl Default for ContainerEngine<Executor> {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl<R: CommandRunner> ContainerEngine<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner: Arc::new(runner),
        }
    }
}

impl<R: CommandRunner + ?Sized> ContainerEngine<R> {
    pub fn from_shared(runner: Arc<R>) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &Arc<R> {
        &self.runner
    }

    // System

    pub fn system_start(&self) -> Result<()> {
        self.first_successful(candidates::system_start()).map(drop)
    }

    pub fn system_stop(&self) -> Result<()> {
        self.first_successful(candidates::system_stop()).map(drop)
    }

    pub fn system_status(&self) -> Result<SystemStatusRecord> {
        let res = self.first_successful(candidates::system_status())?;
        Ok(SystemStatusRecord::from_output(&res.stdout))
    }

    pub fn system_logs(&self, follow: bool) -> CandidateStream<R> {
        self.stream_first_successful(candidates::system_logs(follow))
    }

    // Containers

    /// Containers known to the backend. Output that is not JSON yields an
    /// empty list.
    pub fn list_containers(&self, all: bool) -> Result<Vec<ContainerRecord>> {
        let res = self.first_successful(candidates::list_containers(all))?;
        Ok(decode_records(&res.stdout)
            .into_iter()
            .map(ContainerRecord::from_raw)
            .collect())
    }

    pub fn start_container(&self, id: &str) -> Result<()> {
        self.first_successful(candidates::container_action("start", id))
            .map(drop)
    }

    pub fn stop_container(&self, id: &str) -> Result<()> {
        self.first_successful(candidates::container_action("stop", id))
            .map(drop)
    }

    pub fn kill_container(&self, id: &str) -> Result<()> {
        self.first_successful(candidates::container_action("kill", id))
            .map(drop)
    }

    pub fn delete_container(&self, id: &str, force: bool) -> Result<()> {
        self.first_successful(candidates::delete_container(id, force))
            .map(drop)
    }

    /// The backend's description of a container, trimmed.
    pub fn inspect_container(&self, id: &str) -> Result<String> {
        let res = self.first_successful(candidates::inspect_container(id))?;
        Ok(res.stdout.trim().to_string())
    }

    pub fn container_logs(&self, id: &str, follow: bool, boot: bool) -> CandidateStream<R> {
        self.stream_first_successful(candidates::container_logs(id, follow, boot))
    }

    // Images

    pub fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let res = self.first_successful(candidates::list_images())?;
        Ok(decode_records(&res.stdout)
            .into_iter()
            .map(ImageRecord::from_raw)
            .collect())
    }

    pub fn pull_image(&self, reference: &str) -> Result<()> {
        self.first_successful(candidates::pull_image(reference))
            .map(drop)
    }

    pub fn delete_image(&self, reference: &str, force: bool) -> Result<()> {
        self.first_successful(candidates::delete_image(reference, force))
            .map(drop)
    }

    pub fn inspect_image(&self, reference: &str) -> Result<String> {
        let res = self.first_successful(candidates::inspect_image(reference))?;
        Ok(res.stdout.trim().to_string())
    }

    // Builder

    pub fn builder_status(&self) -> Result<BuilderStatusRecord> {
        let res = self.first_successful(candidates::builder_status())?;
        Ok(BuilderStatusRecord::from_output(&res.stdout))
    }

    pub fn builder_start(&self, cpus: Option<u32>, memory: Option<&str>) -> Result<()> {
        self.first_successful(candidates::builder_start(cpus, memory))
            .map(drop)
    }

    pub fn builder_stop(&self) -> Result<()> {
        self.first_successful(candidates::builder_stop()).map(drop)
    }

    // Raw commands

    /// Run `inv` exactly as given.
    ///
    /// With `check_exit_code` off, a non-zero exit is returned as data and the
    /// result's arguments always equal `inv.args`.
    pub fn run_command(&self, inv: &Invocation, check_exit_code: bool) -> Result<ExecutionResult> {
        self.run_command_with_input(inv, None, check_exit_code)
    }

    /// [`ContainerEngine::run_command`] with bytes fed to the child's stdin.
    pub fn run_command_with_input(
        &self,
        inv: &Invocation,
        stdin: Option<&[u8]>,
        check_exit_code: bool,
    ) -> Result<ExecutionResult> {
        let res = self.runner.run(inv, stdin)?;
        if check_exit_code {
            res.into_checked()
        } else {
            Ok(res)
        }
    }

    /// Stream `inv` exactly as given. Start failures arrive as the stream's
    /// only item.
    pub fn stream_command(&self, inv: &Invocation) -> CandidateStream<R> {
        let list: CandidateList = [inv.args.clone()].into_iter().collect();
        stream_candidates(
            Arc::clone(&self.runner),
            inv.clone(),
            list,
            FallbackPolicy::compatibility(),
        )
    }

    // Docker-style commands

    /// Translate docker-style arguments and run the first native spelling
    /// the backend accepts.
    ///
    /// Only compatibility failures move on to the next spelling. Any other
    /// failure is an error, or with `check_exit_code` off is returned as
    /// data without trying further spellings.
    pub fn run_docker_compatible_command(
        &self,
        inv: &Invocation,
        check_exit_code: bool,
    ) -> Result<ExecutionResult> {
        if inv.args.is_empty() {
            return Err(EngineError::EmptyCommand);
        }
        let check = if check_exit_code {
            ExitCheck::Enforce
        } else {
            ExitCheck::Report
        };
        run_candidates(
            self.runner.as_ref(),
            inv,
            &docker_compatible_candidates(&inv.args),
            &FallbackPolicy::compatibility(),
            check,
        )
    }

    /// Streaming counterpart of
    /// [`ContainerEngine::run_docker_compatible_command`].
    pub fn stream_docker_compatible_command(&self, inv: &Invocation) -> Result<CandidateStream<R>> {
        if inv.args.is_empty() {
            return Err(EngineError::EmptyCommand);
        }
        Ok(stream_candidates(
            Arc::clone(&self.runner),
            inv.clone(),
            docker_compatible_candidates(&inv.args),
            FallbackPolicy::compatibility(),
        ))
    }

    /// Tokenize a typed command line such as `docker ps --all` and run it
    /// through the dialect translation.
    pub fn run_docker_line(&self, line: &str, check_exit_code: bool) -> Result<ExecutionResult> {
        let args = normalized_arguments(line)?;
        self.run_docker_compatible_command(&Invocation::new(args), check_exit_code)
    }

    pub fn stream_docker_line(&self, line: &str) -> Result<CandidateStream<R>> {
        let args = normalized_arguments(line)?;
        self.stream_docker_compatible_command(&Invocation::new(args))
    }

    fn first_successful(&self, list: CandidateList) -> Result<ExecutionResult> {
        run_first_successful(self.runner.as_ref(), &Invocation::default(), &list)
    }

    fn stream_first_successful(&self, list: CandidateList) -> CandidateStream<R> {
        stream_first_successful(Arc::clone(&self.runner), Invocation::default(), list)
    }
}

/// Raw JSON of an inspect call, when the backend produced an object.
pub fn inspect_json(text: &str) -> Option<serde_json::Value> {
    decode_object(text).map(serde_json::Value::Object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::scripted::{Reply, ScriptedRunner};
    use crate::records::ContainerState;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn engine(script: impl Fn(&[String]) -> Reply + Send + Sync + 'static) -> ContainerEngine<ScriptedRunner> {
        ContainerEngine::with_runner(ScriptedRunner::new(script))
    }

    #[test]
    fn docker_mapping_table_hits_first_native_spelling_only() {
        let mappings: [(&[&str], &[&str]); 11] = [
            (&["ps", "--all"], &["list", "--all"]),
            (&["images"], &["image", "list"]),
            (&["rm", "abc123"], &["delete", "abc123"]),
            (&["rmi", "nginx:latest"], &["image", "delete", "nginx:latest"]),
            (&["container", "ls", "-a"], &["list", "-a"]),
            (&["container", "rm", "abc123"], &["delete", "abc123"]),
            (&["image", "ls"], &["image", "list"]),
            (&["system", "status"], &["system", "status"]),
            (&["buildx", "ls"], &["builder", "status"]),
            (&["compose", "ps"], &["compose", "ps"]),
            (&["network", "ls"], &["network", "ls"]),
        ];
        let eng = engine(|_| Reply::ok("ok"));
        for (requested, expected) in mappings {
            let res = eng
                .run_docker_compatible_command(&Invocation::new(requested.iter().copied()), true)
                .unwrap();
            assert_eq!(res.arguments, argv(expected), "{requested:?}");
            assert_eq!(res.exit_code, 0);
        }
        let calls = eng.runner().calls();
        let expected: Vec<Vec<String>> = mappings.iter().map(|(_, e)| argv(e)).collect();
        assert_eq!(calls, expected);
    }

    #[test]
    fn ps_falls_back_from_list_to_ls() {
        let eng = engine(|args| match args[0].as_str() {
            "list" => Reply::unknown_command("list"),
            "ls" => Reply::ok(r#"{"ID":"abc123","Name":"web","Image":"nginx:latest","Status":"Running"}"#),
            _ => Reply::fail(127, "unsupported"),
        });
        let res = eng
            .run_docker_compatible_command(&Invocation::new(["ps", "--all"]), true)
            .unwrap();
        assert_eq!(res.arguments, argv(&["ls", "--all"]));
        assert!(res.stdout.contains(r#""ID":"abc123""#));
        assert_eq!(
            eng.runner().calls(),
            [argv(&["list", "--all"]), argv(&["ls", "--all"])]
        );
    }

    #[test]
    fn permission_denied_is_not_a_dialect_problem() {
        let eng = engine(|_| Reply::fail(1, "permission denied"));
        let err = eng
            .run_docker_compatible_command(&Invocation::new(["ps", "--all"]), true)
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::CommandFailed { ref args, exit_code: 1, .. } if *args == argv(&["list", "--all"])
        ));
        assert_eq!(eng.runner().calls().len(), 1);
    }

    #[test]
    fn empty_docker_command_is_rejected() {
        let eng = engine(|_| Reply::ok(""));
        assert_eq!(
            eng.run_docker_compatible_command(&Invocation::default(), true),
            Err(EngineError::EmptyCommand)
        );
        assert!(eng.stream_docker_compatible_command(&Invocation::default()).is_err());
        assert_eq!(eng.run_docker_line("docker", true), Err(EngineError::EmptyCommand));
        assert!(eng.runner().calls().is_empty());
    }

    #[test]
    fn docker_line_is_tokenized_and_translated() {
        let eng = engine(|_| Reply::ok(""));
        let res = eng
            .run_docker_line(r#"docker rm "my app""#, true)
            .unwrap();
        assert_eq!(res.arguments, argv(&["delete", "my app"]));
        assert!(matches!(
            eng.run_docker_line("docker run \"oops", true),
            Err(EngineError::UnterminatedQuote('"'))
        ));
    }

    #[test]
    fn raw_command_round_trips_arguments_regardless_of_exit() {
        let eng = engine(|args| {
            if args.first().map(String::as_str) == Some("fail") {
                Reply::fail(3, "nope")
            } else {
                Reply::ok("fine")
            }
        });
        for args in [argv(&["fail", "--x", "y z"]), argv(&["ok"]), Vec::new()] {
            let res = eng.run_command(&Invocation::new(args.clone()), false).unwrap();
            assert_eq!(res.arguments, args);
        }
        let err = eng
            .run_command(&Invocation::new(["fail"]), true)
            .unwrap_err();
        assert_eq!(err.stderr(), Some("nope"));
    }

    #[test]
    fn system_status_tries_json_spellings_first() {
        let eng = engine(|args| {
            if args.iter().any(|a| a == "--format") {
                Reply::ok(r#"{"status": "running", "running": true}"#)
            } else {
                Reply::fail(1, "unexpected")
            }
        });
        let status = eng.system_status().unwrap();
        assert!(status.running);
        assert_eq!(status.message, "running");
        assert_eq!(eng.runner().calls().len(), 1);
    }

    #[test]
    fn system_status_falls_back_to_text() {
        let eng = engine(|args| {
            if args.len() == 2 {
                Reply::ok("apiserver is running\n")
            } else {
                Reply::fail(64, "unknown flag: --format")
            }
        });
        let status = eng.system_status().unwrap();
        assert!(status.running);
        assert_eq!(status.message, "apiserver is running");
        assert_eq!(eng.runner().calls().len(), 3);
    }

    #[test]
    fn list_containers_maps_records() {
        let eng = engine(|_| {
            Reply::ok(
                r#"[{"ID":"abc123","Name":"web","Image":"nginx:latest","Status":"Running","Ports":"127.0.0.1:8080->80/tcp"},
                    {"id":"def456","state":"stopped"}]"#,
            )
        });
        let list = eng.list_containers(true).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "abc123");
        assert_eq!(list[0].state, ContainerState::Running);
        assert!(list[0].ports.is_some());
        assert_eq!(list[1].state, ContainerState::Stopped);
        assert_eq!(eng.runner().calls()[0], argv(&["list", "--all", "--format", "json"]));
    }

    #[test]
    fn text_listing_yields_no_records() {
        let eng = engine(|args| {
            if args.contains(&"--format".to_string()) {
                Reply::fail(64, "unknown flag: --format")
            } else {
                Reply::ok("ID  IMAGE  STATE\nabc  nginx  running\n")
            }
        });
        assert!(eng.list_containers(false).unwrap().is_empty());
        assert_eq!(eng.runner().calls().last(), Some(&argv(&["list"])));
    }

    #[test]
    fn list_images_maps_references() {
        let eng = engine(|_| {
            Reply::ok(r#"{"Repository":"nginx","Tag":"latest","ID":"sha256:deadbeef","Size":"100MB"}"#)
        });
        let images = eng.list_images().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].reference(), "nginx:latest");
    }

    #[test]
    fn delete_container_falls_back_to_rm() {
        let eng = engine(|args| match args[0].as_str() {
            "delete" => Reply::fail(1, "Error: unknown command \"delete\""),
            _ => Reply::ok(""),
        });
        eng.delete_container("web", true).unwrap();
        assert_eq!(
            eng.runner().calls(),
            [argv(&["delete", "--force", "web"]), argv(&["rm", "--force", "web"])]
        );
    }

    #[test]
    fn lifecycle_failure_carries_details() {
        let eng = engine(|_| Reply::fail(1, "container web not found"));
        let err = eng.stop_container("web").unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("Command failed (1):"), "{text}");
        assert!(text.contains("stop web"), "{text}");
        assert!(text.ends_with("container web not found"), "{text}");
    }

    #[test]
    fn inspect_output_is_trimmed() {
        let eng = engine(|_| Reply::ok("\n  {\"id\": \"web\"}\n\n"));
        let text = eng.inspect_container("web").unwrap();
        assert_eq!(text, "{\"id\": \"web\"}");
        assert_eq!(inspect_json(&text).unwrap()["id"], "web");
        assert!(inspect_json("not json").is_none());
    }

    #[test]
    fn builder_start_passes_resources() {
        let eng = engine(|_| Reply::ok(""));
        eng.builder_start(Some(2), Some("4g")).unwrap();
        assert_eq!(
            eng.runner().calls(),
            [argv(&["builder", "start", "--cpus", "2", "--memory", "4g"])]
        );
        let status = engine(|_| Reply::ok("builder is stopped")).builder_status().unwrap();
        assert!(!status.running);
    }

    #[test]
    fn container_logs_fall_back_to_grouped_spelling() {
        let eng = engine(|args| match args[0].as_str() {
            "logs" => Reply::unknown_command("logs"),
            _ => Reply::ok("booting\nready\n"),
        });
        let lines: Vec<String> = eng
            .container_logs("web", true, false)
            .map(|l| l.unwrap().text)
            .collect();
        assert_eq!(lines, ["booting", "ready"]);
        assert_eq!(
            eng.runner().calls(),
            [
                argv(&["logs", "--follow", "web"]),
                argv(&["container", "logs", "--follow", "web"])
            ]
        );
    }

    #[test]
    fn stream_command_reports_start_failure_in_band() {
        let eng = engine(|_| Reply::StartFailure(EngineError::ExecutableNotFound("container".into())));
        let items: Vec<_> = eng.stream_command(&Invocation::new(["events"])).collect();
        assert_eq!(items, [Err(EngineError::ExecutableNotFound("container".into()))]);
    }

    #[test]
    fn compose_runs_report_failures_as_data() {
        let eng = engine(|args| match args[0].as_str() {
            "compose" => Reply::unknown_command("compose"),
            _ => Reply::fail(1, "no such service: web"),
        });
        let project = ComposeProject::new("", "shop");
        let res = eng.compose_up(&project, true).unwrap();
        assert_eq!(res.exit_code, 1);
        assert_eq!(res.arguments, argv(&["system", "compose", "-p", "shop", "up", "-d"]));
        let text = render_transcript(&project.command(&["up", "-d"]), &res);
        assert!(text.contains("executed: /usr/local/bin/container system compose -p shop up -d"));
        assert!(text.contains("stderr:\nno such service: web"));
    }

    #[test]
    fn compose_logs_streams_follow_for_service() {
        let eng = engine(|_| Reply::ok("web | listening\n"));
        let lines: Vec<String> = eng
            .compose_logs(&ComposeProject::default(), Some(" web "))
            .unwrap()
            .map(|l| l.unwrap().text)
            .collect();
        assert_eq!(lines, ["web | listening"]);
        assert_eq!(
            eng.runner().calls(),
            [argv(&["compose", "-f", "compose.yaml", "logs", "--follow", "web"])]
        );
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ContainerEngine>();
        assert_send_sync::<ContainerEngine<ScriptedRunner>>();

        let eng = engine(|_| Reply::ok(""));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let eng = eng.clone();
                std::thread::spawn(move || eng.start_container(&format!("c{i}")))
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }
        assert_eq!(eng.runner().calls().len(), 4);
    }
}
