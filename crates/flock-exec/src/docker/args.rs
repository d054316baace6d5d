//! Argument vectors of the docker subcommands.
use flock_model::{ImageRef, UnitName};

use super::DockerConfig;

/// Go template printing one JSON object per line.
pub(super) const JSON_FORMAT: &str = "{{json .}}";

pub(super) fn global(cfg: &DockerConfig) -> Vec<String> {
    match &cfg.host {
        Some(host) => vec!["-H".into(), host.clone()],
        None => Vec::new(),
    }
}

pub(super) fn ps(all: bool) -> Vec<String> {
    let mut args = vec!["ps".to_string()];
    if all {
        args.push("-a".into());
    }
    args.extend(["--no-trunc", "--format", JSON_FORMAT].map(String::from));
    args
}

pub(super) fn images() -> Vec<String> {
    vec![
        "images".into(),
        "--format".into(),
        "{{.Repository}}:{{.Tag}}".into(),
    ]
}

/// Detached, interactive, tty: keeps the default entrypoint alive for later execs.
pub(super) fn run(cfg: &DockerConfig, image: &ImageRef, name: &UnitName) -> Vec<String> {
    let mut args = vec!["run".to_string(), "-d".into(), "-i".into(), "-t".into()];
    if !cfg.pull {
        args.extend(["--pull", "never"].map(String::from));
    }
    args.extend([
        "--name".to_string(),
        name.to_string(),
        image.to_string(),
    ]);
    args
}

pub(super) fn inspect(name: &UnitName) -> Vec<String> {
    vec![
        "inspect".into(),
        "--type".into(),
        "container".into(),
        name.to_string(),
    ]
}

pub(super) fn stop(name: &str) -> Vec<String> {
    vec!["stop".into(), name.to_string()]
}

pub(super) fn rm(name: &str, force: bool) -> Vec<String> {
    let mut args = vec!["rm".to_string()];
    if force {
        args.push("-f".into());
    }
    args.push(name.to_string());
    args
}

pub(super) fn exec(cfg: &DockerConfig, name: &str, command: &str) -> Vec<String> {
    vec![
        "exec".into(),
        name.to_string(),
        cfg.shell.clone(),
        "-c".into(),
        command.to_string(),
    ]
}

pub(super) fn cat(name: &str, path: &str) -> Vec<String> {
    vec![
        "exec".into(),
        name.to_string(),
        "cat".into(),
        "--".into(),
        path.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_refuses_to_pull_by_default() {
        let cfg = DockerConfig::default();
        let image = ImageRef::new("python:3.8").unwrap();
        let name = UnitName::new("partition-1-0").unwrap();
        assert_eq!(
            run(&cfg, &image, &name),
            vec![
                "run", "-d", "-i", "-t", "--pull", "never", "--name", "partition-1-0",
                "python:3.8"
            ]
        );

        let cfg = DockerConfig {
            pull: true,
            ..Default::default()
        };
        assert!(!run(&cfg, &image, &name).contains(&"--pull".to_string()));
    }

    #[test]
    fn global_args_carry_the_host() {
        assert!(global(&DockerConfig::default()).is_empty());
        let cfg = DockerConfig {
            host: Some("tcp://10.0.0.2:2375".into()),
            ..Default::default()
        };
        assert_eq!(global(&cfg), vec!["-H", "tcp://10.0.0.2:2375"]);
    }

    #[test]
    fn exec_wraps_command_in_shell() {
        let cfg = DockerConfig::default();
        assert_eq!(
            exec(&cfg, "web", "ls -l | wc -l"),
            vec!["exec", "web", "sh", "-c", "ls -l | wc -l"]
        );
        assert_eq!(cat("web", "/app/fig.png"), vec!["exec", "web", "cat", "--", "/app/fig.png"]);
    }

    #[test]
    fn listing_args() {
        assert_eq!(ps(false), vec!["ps", "--no-trunc", "--format", "{{json .}}"]);
        assert_eq!(ps(true)[1], "-a");
        assert_eq!(rm("web", true), vec!["rm", "-f", "web"]);
        assert_eq!(rm("web", false), vec!["rm", "web"]);
    }
}
