//! version command - Print the gitpgm version

use anyhow::Result;

use super::{Activated, Builtin, InitContext, Streams};

/// Print `gitpgm version <version>`.
#[derive(Debug, Default)]
pub struct Version;

impl Version {
    pub fn boxed() -> Box<dyn Builtin> {
        Box::new(Self)
    }
}

impl Builtin for Version {
    fn requires_repository(&self) -> bool {
        false
    }

    fn init<'io>(self: Box<Self>, ctx: InitContext<'io>) -> Box<dyn Activated + 'io> {
        Box::new(VersionRun { io: ctx.io })
    }
}

struct VersionRun<'io> {
    io: Streams<'io>,
}

impl Activated for VersionRun<'_> {
    fn execute(&mut self, args: &[String]) -> Result<()> {
        if let Some(extra) = args.first() {
            anyhow::bail!("version: unexpected argument '{}'", extra);
        }
        writeln!(self.io.out, "gitpgm version {}", env!("CARGO_PKG_VERSION"))?;
        Ok(())
    }
}
