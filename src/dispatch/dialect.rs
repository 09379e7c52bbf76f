//! Docker-style commands mapped onto native `container` spellings.
//!
//! Everything here is data. A spelling is a prefix; the caller's remaining
//! arguments are appended to it. [`VERB`] inside a spelling stands for the
//! verb or sub-verb the caller actually typed.

use super::candidates::CandidateList;

/// Placeholder for the verb being translated.
pub const VERB: &str = "{verb}";

type Spelling = &'static [&'static str];

/// Native spellings for a set of equivalent verbs, most preferred first.
struct Mapping {
    verbs: &'static [&'static str],
    spellings: &'static [Spelling],
}

/// A command group such as `container <sub>`, translated per sub-verb.
struct Group {
    names: &'static [&'static str],
    /// Spellings when no sub-verb follows the group word.
    bare: &'static [Spelling],
    subs: &'static [Mapping],
    /// Spellings for sub-verbs with no entry in `subs`.
    other: &'static [Spelling],
    /// Tried after `other`, without the caller's remaining arguments.
    other_bare: &'static [Spelling],
}

const TOP_LEVEL: &[Mapping] = &[
    Mapping {
        verbs: &["ps"],
        spellings: &[&["list"], &["ls"], &["ps"]],
    },
    Mapping {
        verbs: &["images"],
        spellings: &[&["image", "list"], &["image", "ls"], &["images"]],
    },
    Mapping {
        verbs: &["rm"],
        spellings: &[&["delete"], &["rm"]],
    },
    Mapping {
        verbs: &["rmi"],
        spellings: &[&["image", "delete"], &["image", "rm"], &["rmi"]],
    },
    Mapping {
        verbs: &["info"],
        spellings: &[&["system", "status"], &["info"]],
    },
    Mapping {
        verbs: &["compose"],
        spellings: &[&["compose"], &["system", "compose"]],
    },
    Mapping {
        verbs: &["pull", "push", "tag"],
        spellings: &[&["image", VERB], &[VERB]],
    },
    Mapping {
        verbs: &["login", "logout"],
        spellings: &[&["registry", VERB], &[VERB]],
    },
];

const GROUPS: &[Group] = &[
    Group {
        names: &["container"],
        bare: &[],
        subs: &[
            Mapping {
                verbs: &["ls", "list", "ps"],
                spellings: &[&["list"], &["ls"], &["container", "ls"]],
            },
            Mapping {
                verbs: &["rm", "delete", "remove"],
                spellings: &[&["delete"], &["container", "rm"], &["rm"]],
            },
            Mapping {
                verbs: &[
                    "inspect", "start", "stop", "kill", "logs", "exec", "cp", "diff", "restart",
                    "wait", "create", "run",
                ],
                spellings: &[&[VERB], &["container", VERB]],
            },
        ],
        other: &[],
        other_bare: &[],
    },
    Group {
        names: &["image"],
        bare: &[],
        subs: &[
            Mapping {
                verbs: &["ls", "list"],
                spellings: &[&["image", "list"], &["image", "ls"], &["images"]],
            },
            Mapping {
                verbs: &["rm", "delete", "remove"],
                spellings: &[&["image", "delete"], &["image", "rm"], &["rmi"]],
            },
            Mapping {
                verbs: &["pull", "push", "tag", "inspect", "save", "load", "prune"],
                spellings: &[&["image", VERB], &[VERB]],
            },
        ],
        other: &[],
        other_bare: &[],
    },
    Group {
        names: &["system"],
        bare: &[&["system", "status"], &["info"]],
        subs: &[
            Mapping {
                verbs: &["start", "stop", "status", "logs"],
                spellings: &[&["system", VERB]],
            },
            Mapping {
                verbs: &["info"],
                spellings: &[&["system", "status"], &["info"]],
            },
        ],
        other: &[&["system", VERB]],
        other_bare: &[&["info"]],
    },
    Group {
        names: &["buildx", "builder"],
        bare: &[],
        subs: &[
            Mapping {
                verbs: &["ls", "list"],
                spellings: &[&["builder", "status"], &["builder", "ls"], &["buildx", "ls"]],
            },
            Mapping {
                verbs: &["stop"],
                spellings: &[&["builder", "stop"], &["buildx", "stop"]],
            },
            Mapping {
                verbs: &["start"],
                spellings: &[&["builder", "start"], &["buildx", "inspect", "--bootstrap"]],
            },
        ],
        other: &[&["builder", VERB], &["buildx", VERB]],
        other_bare: &[],
    },
];

/// Candidate invocations for a docker-style argument vector.
///
/// Native spellings come first, deduplicated, and the untranslated
/// arguments always come last. Verbs with no mapping yield only the
/// untranslated arguments. An empty vector yields no candidates.
pub fn docker_compatible_candidates(args: &[String]) -> CandidateList {
    let mut list = CandidateList::new();
    let Some((head, rest)) = args.split_first() else {
        return list;
    };
    let head = head.to_lowercase();

    if let Some(group) = GROUPS.iter().find(|g| g.names.contains(&head.as_str())) {
        match rest.split_first() {
            None => push_all(&mut list, group.bare, "", rest),
            Some((sub, rest)) => {
                let sub = sub.to_lowercase();
                match find(group.subs, &sub) {
                    Some(spellings) => push_all(&mut list, spellings, &sub, rest),
                    None => {
                        push_all(&mut list, group.other, &sub, rest);
                        push_all(&mut list, group.other_bare, &sub, &[]);
                    }
                }
            }
        }
    } else if let Some(spellings) = find(TOP_LEVEL, &head) {
        push_all(&mut list, spellings, &head, rest);
    }

    list.push(args.iter().cloned());
    list
}

fn find(table: &'static [Mapping], verb: &str) -> Option<&'static [Spelling]> {
    table
        .iter()
        .find(|m| m.verbs.contains(&verb))
        .map(|m| m.spellings)
}

fn push_all(list: &mut CandidateList, spellings: &[Spelling], verb: &str, rest: &[String]) {
    for spelling in spellings {
        let prefix = spelling
            .iter()
            .map(|part| if *part == VERB { verb } else { *part });
        list.push(prefix.map(str::to_string).chain(rest.iter().cloned()));
    }
}
