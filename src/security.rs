use std::path::Path;

/// One Deno permission: denied, granted for everything, or granted for a list of targets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Grant {
    #[default]
    Denied,
    All,
    Only(Vec<String>),
}

impl Grant {
    fn push(&mut self, target: String) {
        match self {
            Grant::Denied => *self = Grant::Only(vec![target]),
            Grant::Only(targets) => targets.push(target),
            Grant::All => {}
        }
    }

    fn to_flag(&self, name: &str) -> Option<String> {
        match self {
            Grant::Denied => None,
            Grant::All => Some(format!("--allow-{name}")),
            Grant::Only(targets) => Some(format!("--allow-{name}={}", targets.join(","))),
        }
    }
}

/// Sandbox for running chart code. Every permission is spelled out; nothing is inherited.
#[derive(Debug, Clone, Default)]
pub struct DenoPermissions {
    pub read: Grant,
    pub write: Grant,
    pub net: Grant,
    pub run: Grant,
    pub env: Grant,
}

impl DenoPermissions {
    /// Permissions for rendering a chart living inside `workspace_root`.
    ///
    /// Chart code may read and write its own workspace, read the plugin installation, talk to
    /// the network, spawn processes and read the environment.
    pub fn for_render(workspace_root: &Path, plugin_dir: &Path) -> Self {
        let mut permissions = Self {
            net: Grant::All,
            run: Grant::All,
            env: Grant::All,
            ..Self::default()
        };
        permissions
            .allow_read(workspace_root)
            .allow_read(plugin_dir)
            .allow_write(workspace_root);
        permissions
    }

    pub fn to_deno_args(&self) -> Vec<String> {
        [
            self.read.to_flag("read"),
            self.write.to_flag("write"),
            self.net.to_flag("net"),
            self.run.to_flag("run"),
            self.env.to_flag("env"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn allow_read<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.read.push(path.as_ref().to_string_lossy().to_string());
        self
    }

    pub fn allow_write<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.write.push(path.as_ref().to_string_lossy().to_string());
        self
    }
}
