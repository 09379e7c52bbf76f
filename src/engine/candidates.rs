//! Hand-written candidate lists for each facade action.
//!
//! JSON spellings come before plain-text ones so the record mappers get
//! structured output whenever the backend can produce it.

use crate::dispatch::CandidateList;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

fn single(parts: &[&str]) -> CandidateList {
    [argv(parts)].into_iter().collect()
}

/// `prefix [--force] target` for each prefix.
fn forced(prefixes: &[&[&str]], force: bool, target: &str) -> CandidateList {
    prefixes
        .iter()
        .map(|prefix| {
            let mut args = argv(prefix);
            if force {
                args.push("--force".into());
            }
            args.push(target.into());
            args
        })
        .collect()
}

pub fn system_start() -> CandidateList {
    single(&["system", "start"])
}

pub fn system_stop() -> CandidateList {
    single(&["system", "stop"])
}

pub fn system_status() -> CandidateList {
    [
        argv(&["system", "status", "--format", "json"]),
        argv(&["system", "status", "--json"]),
        argv(&["system", "status"]),
    ]
    .into_iter()
    .collect()
}

pub fn system_logs(follow: bool) -> CandidateList {
    let mut args = argv(&["system", "logs"]);
    if follow {
        args.push("--follow".into());
    }
    [args].into_iter().collect()
}

pub fn list_containers(all: bool) -> CandidateList {
    let spellings: &[&[&str]] = if all {
        &[
            &["list", "--all", "--format", "json"],
            &["list", "-a", "--format", "json"],
            &["ls", "--all", "--format", "json"],
            &["ls", "-a", "--format", "json"],
            &["list", "--all"],
            &["list", "-a"],
            &["ls", "-a"],
        ]
    } else {
        &[
            &["list", "--format", "json"],
            &["ls", "--format", "json"],
            &["list"],
            &["ls"],
        ]
    };
    spellings.iter().map(|s| s.iter().copied()).collect()
}

/// `start`, `stop`, `kill` and friends: one spelling, target last.
pub fn container_action(verb: &str, id: &str) -> CandidateList {
    single(&[verb, id])
}

pub fn delete_container(id: &str, force: bool) -> CandidateList {
    forced(&[&["delete"], &["rm"]], force, id)
}

pub fn inspect_container(id: &str) -> CandidateList {
    [
        argv(&["inspect", id, "--format", "json"]),
        argv(&["inspect", id]),
    ]
    .into_iter()
    .collect()
}

pub fn container_logs(id: &str, follow: bool, boot: bool) -> CandidateList {
    let mut flags = Vec::new();
    if follow {
        flags.push("--follow");
    }
    if boot {
        flags.push("--boot");
    }
    [&["logs"][..], &["container", "logs"][..]]
        .into_iter()
        .map(|prefix| {
            let mut args = argv(prefix);
            args.extend(argv(&flags));
            args.push(id.to_string());
            args
        })
        .collect()
}

pub fn list_images() -> CandidateList {
    [
        argv(&["image", "list", "--format", "json"]),
        argv(&["image", "ls", "--format", "json"]),
        argv(&["image", "list"]),
        argv(&["image", "ls"]),
    ]
    .into_iter()
    .collect()
}

pub fn pull_image(reference: &str) -> CandidateList {
    single(&["image", "pull", reference])
}

pub fn delete_image(reference: &str, force: bool) -> CandidateList {
    forced(&[&["image", "delete"], &["image", "rm"]], force, reference)
}

pub fn inspect_image(reference: &str) -> CandidateList {
    [
        argv(&["image", "inspect", reference, "--format", "json"]),
        argv(&["image", "inspect", reference]),
    ]
    .into_iter()
    .collect()
}

pub fn builder_status() -> CandidateList {
    [
        argv(&["builder", "status", "--json"]),
        argv(&["builder", "status", "--format", "json"]),
        argv(&["builder", "status"]),
    ]
    .into_iter()
    .collect()
}

pub fn builder_start(cpus: Option<u32>, memory: Option<&str>) -> CandidateList {
    let mut args = argv(&["builder", "start"]);
    if let Some(cpus) = cpus {
        args.extend(["--cpus".to_string(), cpus.to_string()]);
    }
    if let Some(memory) = memory {
        args.extend(["--memory".to_string(), memory.to_string()]);
    }
    [args].into_iter().collect()
}

pub fn builder_stop() -> CandidateList {
    single(&["builder", "stop"])
}
