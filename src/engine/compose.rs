use crate::dispatch::CandidateStream;
use crate::error::Result;
use crate::process::{CommandRunner, ExecutionResult, Invocation};

use super::ContainerEngine;

/// Which compose file and project name a compose command targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeProject {
    pub file: String,
    pub project: String,
}

impl Default for ComposeProject {
    fn default() -> Self {
        Self {
            file: "compose.yaml".to_string(),
            project: String::new(),
        }
    }
}

impl ComposeProject {
    pub fn new(file: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            project: project.into(),
        }
    }

    /// `compose [-f FILE] [-p PROJECT] <subcommand..>`, skipping blank
    /// file or project values.
    pub fn command<S: AsRef<str>>(&self, subcommand: &[S]) -> Vec<String> {
        let mut args = vec!["compose".to_string()];
        let file = self.file.trim();
        if !file.is_empty() {
            args.extend(["-f".to_string(), file.to_string()]);
        }
        let project = self.project.trim();
        if !project.is_empty() {
            args.extend(["-p".to_string(), project.to_string()]);
        }
        args.extend(subcommand.iter().map(|s| s.as_ref().to_string()));
        args
    }

    pub fn logs_title(&self) -> String {
        match self.project.trim() {
            "" => "Compose Logs".to_string(),
            project => format!("Compose Logs ({project})"),
        }
    }
}

impl<R: CommandRunner + ?Sized> ContainerEngine<R> {
    pub fn compose_up(&self, project: &ComposeProject, detached: bool) -> Result<ExecutionResult> {
        let mut sub = vec!["up"];
        if detached {
            sub.push("-d");
        }
        self.run_compose(project, &sub)
    }

    pub fn compose_down(
        &self,
        project: &ComposeProject,
        remove_volumes: bool,
    ) -> Result<ExecutionResult> {
        let mut sub = vec!["down"];
        if remove_volumes {
            sub.push("--volumes");
        }
        self.run_compose(project, &sub)
    }

    pub fn compose_pull(&self, project: &ComposeProject) -> Result<ExecutionResult> {
        self.run_compose(project, &["pull"])
    }

    pub fn compose_build(&self, project: &ComposeProject) -> Result<ExecutionResult> {
        self.run_compose(project, &["build"])
    }

    pub fn compose_ps(&self, project: &ComposeProject) -> Result<ExecutionResult> {
        self.run_compose(project, &["ps", "--all"])
    }

    /// Follow the project's logs, optionally for a single service.
    pub fn compose_logs(
        &self,
        project: &ComposeProject,
        service: Option<&str>,
    ) -> Result<CandidateStream<R>> {
        let mut sub = vec!["logs", "--follow"];
        if let Some(service) = service.map(str::trim).filter(|s| !s.is_empty()) {
            sub.push(service);
        }
        self.stream_docker_compatible_command(&Invocation::new(project.command(&sub)))
    }

    /// Non-zero exits come back as data so the caller can show the output.
    fn run_compose(&self, project: &ComposeProject, sub: &[&str]) -> Result<ExecutionResult> {
        self.run_docker_compatible_command(&Invocation::new(project.command(sub)), false)
    }
}
