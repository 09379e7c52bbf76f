/// A docker verb with a one-line summary and an example invocation
/// (without the leading `docker`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DockerCommand {
    pub name: &'static str,
    pub summary: &'static str,
    pub example: &'static str,
}

impl DockerCommand {
    /// The example as a pasteable command line.
    pub fn template(&self) -> String {
        format!("docker {}", self.example)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSection {
    pub title: &'static str,
    pub commands: &'static [DockerCommand],
}

const fn cmd(name: &'static str, summary: &'static str, example: &'static str) -> DockerCommand {
    DockerCommand {
        name,
        summary,
        example,
    }
}

pub const SECTIONS: &[CommandSection] = &[
    CommandSection {
        title: "Common",
        commands: &[
            cmd("run", "Create and run a new container from an image", "run --rm hello-world"),
            cmd("exec", "Execute a command in a running container", "exec -it <container> /bin/sh"),
            cmd("ps", "List containers", "ps --all"),
            cmd("build", "Build an image from a Dockerfile", "build -t my-image ."),
            cmd("pull", "Download an image from a registry", "pull nginx:latest"),
            cmd("push", "Upload an image to a registry", "push my-registry/my-image:latest"),
            cmd("images", "List images", "images"),
            cmd("login", "Authenticate to a registry", "login"),
            cmd("logout", "Log out from a registry", "logout"),
            cmd("search", "Search Docker Hub", "search nginx"),
            cmd("version", "Show Docker version information", "version"),
            cmd("info", "Display system-wide information", "info"),
        ],
    },
    CommandSection {
        title: "Management",
        commands: &[
            cmd("builder", "Manage builds", "builder ls"),
            cmd("buildx", "Docker Buildx", "buildx ls"),
            cmd("compose", "Docker Compose", "compose ls"),
            cmd("container", "Manage containers", "container ls --all"),
            cmd("context", "Manage contexts", "context ls"),
            cmd("image", "Manage images", "image ls"),
            cmd("network", "Manage networks", "network ls"),
            cmd("system", "Manage Docker", "system df"),
            cmd("volume", "Manage volumes", "volume ls"),
        ],
    },
    CommandSection {
        title: "Swarm",
        commands: &[
            cmd("config", "Manage Swarm configs", "config ls"),
            cmd("node", "Manage Swarm nodes", "node ls"),
            cmd("secret", "Manage Swarm secrets", "secret ls"),
            cmd("service", "Manage Swarm services", "service ls"),
            cmd("stack", "Manage Swarm stacks", "stack ls"),
            cmd("swarm", "Manage Swarm", "swarm init"),
        ],
    },
    CommandSection {
        title: "Runtime",
        commands: &[
            cmd("attach", "Attach local streams to a running container", "attach <container>"),
            cmd("commit", "Create image from container changes", "commit <container> my-image:latest"),
            cmd("cp", "Copy files/folders between container and local filesystem", "cp <container>:/etc/hosts ./hosts"),
            cmd("create", "Create a new container", "create --name web nginx:latest"),
            cmd("diff", "Inspect filesystem changes", "diff <container>"),
            cmd("events", "Get realtime events from the daemon", "events"),
            cmd("export", "Export a container filesystem as tar", "export <container> > container.tar"),
            cmd("history", "Show image history", "history nginx:latest"),
            cmd("import", "Import filesystem image from tarball", "import rootfs.tar my-image:latest"),
            cmd("inspect", "Return low-level information", "inspect <id>"),
            cmd("kill", "Kill one or more running containers", "kill <container>"),
            cmd("load", "Load an image from a tar archive", "load -i image.tar"),
            cmd("logs", "Fetch logs of a container", "logs --follow <container>"),
            cmd("pause", "Pause all processes in a container", "pause <container>"),
            cmd("port", "List port mappings", "port <container>"),
            cmd("rename", "Rename a container", "rename old-name new-name"),
            cmd("restart", "Restart containers", "restart <container>"),
            cmd("rm", "Remove containers", "rm <container>"),
            cmd("rmi", "Remove images", "rmi <image>"),
            cmd("save", "Save images to tar archive", "save -o image.tar <image>"),
            cmd("start", "Start stopped containers", "start <container>"),
            cmd("stats", "Stream container resource usage", "stats"),
            cmd("stop", "Stop running containers", "stop <container>"),
            cmd("tag", "Create image tag", "tag source:latest target:latest"),
            cmd("top", "Display running processes in a container", "top <container>"),
            cmd("unpause", "Unpause paused containers", "unpause <container>"),
            cmd("update", "Update container configuration", "update --cpus 1 <container>"),
            cmd("wait", "Wait for containers to stop and print exit code", "wait <container>"),
        ],
    },
];

/// Look a verb up across all sections.
pub fn find(name: &str) -> Option<&'static DockerCommand> {
    SECTIONS
        .iter()
        .flat_map(|section| section.commands.iter())
        .find(|c| c.name.eq_ignore_ascii_case(name))
}
