//! Kernelspec installation.

use anyhow::Result;

use bosque_kernel::kernelspec;

pub fn run(user: bool) -> Result<()> {
    let dir = kernelspec::install(user)?;
    println!("Bosque kernelspec installed at {}", dir.display());
    Ok(())
}
