use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use umbra_core::Scene;
use umbra_remote::{RemoteRenderer, RpcServer, DEFAULT_PORT};
use umbra_renderer::{render_save, LocalRenderer, Renderer};

mod demo;

/// SDF path tracer with optional remote render servers
#[derive(Parser)]
#[command(name = "umbra", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve render passes to other machines
    Serve {
        /// TCP port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Render a JSON scene to a PNG, rewritten after every pass
    Render {
        /// Scene description (JSON)
        scene: PathBuf,

        /// Output PNG
        out: PathBuf,

        /// Render server address; repeat for several servers
        #[arg(short, long)]
        remote: Vec<String>,

        /// Also render on this machine when remotes are given
        #[arg(short, long)]
        local: bool,

        /// Ask remotes for compressed rasters
        #[arg(short, long)]
        compress: bool,

        /// Override the scene's pass count (0 = until interrupted)
        #[arg(long)]
        passes: Option<u32>,

        /// Override the scene's random seed (0 = from the clock)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write the built-in showroom scene as JSON
    Demo {
        /// Where to write the scene
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    match Cli::parse().command {
        Command::Serve { port } => serve(port),
        Command::Render {
            scene,
            out,
            remote,
            local,
            compress,
            passes,
            seed,
        } => {
            let mut scene = load_scene(&scene)?;
            if let Some(passes) = passes {
                scene.settings.passes = passes;
            }
            if let Some(seed) = seed {
                scene.seed = seed;
            }
            render(&scene, out, backends(remote, local, compress))
        }
        Command::Demo { out } => {
            let json = serde_json::to_string_pretty(&demo::showroom())?;
            fs::write(&out, json).with_context(|| format!("Failed to write {}", out.display()))?;
            log::info!("Wrote showroom scene to {}", out.display());
            Ok(())
        }
    }
}

fn serve(port: u16) -> Result<()> {
    let server = RpcServer::bind(("0.0.0.0", port))
        .with_context(|| format!("Failed to listen on port {}", port))?
        .with_render_service()
        .start()?;

    // Runs until the process is killed
    server.join();
    Ok(())
}

fn load_scene(path: &Path) -> Result<Scene> {
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let scene: Scene = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse scene {}", path.display()))?;
    Ok(scene)
}

/// Remote renderers for each address, plus a local one when asked for or
/// when there are no remotes.
fn backends(remotes: Vec<String>, local: bool, compress: bool) -> Vec<Arc<dyn Renderer>> {
    let use_local = local || remotes.is_empty();

    let mut renderers: Vec<Arc<dyn Renderer>> = remotes
        .into_iter()
        .map(|addr| {
            Arc::new(RemoteRenderer::new(addr).with_compression(compress)) as Arc<dyn Renderer>
        })
        .collect();

    if use_local {
        renderers.push(Arc::new(LocalRenderer));
    }
    renderers
}

fn render(scene: &Scene, out: PathBuf, renderers: Vec<Arc<dyn Renderer>>) -> Result<()> {
    let settings = &scene.settings;
    if settings.width == 0 || settings.height == 0 {
        bail!("Scene has an empty {}x{} image", settings.width, settings.height);
    }

    log::info!(
        "Rendering {}x{}, {} passes on {} backend(s): {}",
        settings.width,
        settings.height,
        settings.passes,
        renderers.len(),
        renderers
            .iter()
            .map(|renderer| renderer.describe())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let raster = render_save(&out, scene, renderers)
        .with_context(|| format!("Failed to render {}", out.display()))?;
    log::info!("Finished {} with {} rays", out.display(), raster.total_rays());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::parse_from([
            "umbra", "render", "scene.json", "out.png", "-r", "a:1", "--remote", "b:2",
            "--compress", "--passes", "3",
        ]);
        match cli.command {
            Command::Render {
                remote,
                compress,
                passes,
                local,
                ..
            } => {
                assert_eq!(remote, vec!["a:1".to_string(), "b:2".to_string()]);
                assert!(compress);
                assert!(!local);
                assert_eq!(passes, Some(3));
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_serve_default_port() {
        match Cli::parse_from(["umbra", "serve"]).command {
            Command::Serve { port } => assert_eq!(port, 34242),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_backends() {
        assert_eq!(backends(Vec::new(), false, false).len(), 1);
        assert_eq!(backends(vec!["a:1".into()], false, true).len(), 1);
        assert_eq!(backends(vec!["a:1".into()], true, true).len(), 2);
        assert_eq!(backends(vec!["a:1".into()], true, true)[1].describe(), "local");
    }
}
