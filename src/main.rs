// main.rs — 无界面导演播放器：按固定帧率推进轨道，输出相机状态与热点投影
//
// 用法：
//   panorama_director [--config <path>] [--track <uid>] [--view <type>] [--fps <n>]
// 日志级别由 RUST_LOG 控制，默认 info。

use anyhow::{bail, Context, Result};
use panorama_director::config::{self, DirectorConfig};
use panorama_director::{CameraAnimation, ViewType};
use std::cell::Cell;
use std::rc::Rc;

const DEFAULT_FPS: f64 = 60.0;

/// 播放结束后多跑的秒数，上限保护
const TAIL_SECONDS: f64 = 1.0;

#[derive(Debug, Default)]
struct CliArgs {
    config: Option<String>,
    track: Option<String>,
    view: Option<ViewType>,
    fps: Option<f64>,
}

fn parse_args() -> Result<CliArgs> {
    let mut args = CliArgs::default();
    let mut it = std::env::args().skip(1);

    while let Some(a) = it.next() {
        let mut value = || it.next().with_context(|| format!("{} needs a value", a));
        match a.as_str() {
            "--config" => args.config = Some(value()?),
            "--track" => args.track = Some(value()?),
            "--view" => args.view = Some(value()?.parse()?),
            "--fps" => {
                let fps: f64 = value()?.parse().context("--fps expects a number")?;
                if !(fps.is_finite() && fps > 0.0) {
                    bail!("--fps must be positive");
                }
                args.fps = Some(fps);
            }
            other => log::warn!("ignoring unknown argument {}", other),
        }
    }

    Ok(args)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let path = config::resolve_config_path(args.config.as_deref())?;
    let config = DirectorConfig::load(&path).with_context(|| format!("loading {}", path.display()))?;

    let mut camera = config.camera();
    let mut views = config.view_manager();
    if let Some(view_type) = args.view {
        views.set_view_type(view_type);
    }

    let uid = match args.track.as_deref().or_else(|| config.default_track_uid()) {
        Some(uid) => uid.to_string(),
        None => bail!("{} defines no track to play", path.display()),
    };

    let mut animation = CameraAnimation::new(config.registry());
    let finished = Rc::new(Cell::new(false));
    {
        let finished = finished.clone();
        animation.set_on_complete(move || finished.set(true));
    }
    animation.play(uid.as_str(), &mut camera)?;

    let fps = args.fps.unwrap_or(DEFAULT_FPS);
    let dt = 1.0 / fps;
    let duration = animation
        .meta()
        .animations()
        .iter()
        .map(|a| a.duration())
        .fold(0.0, f64::max);
    let max_frames = ((duration + TAIL_SECONDS) * fps).ceil() as u64;
    let report_every = fps.round().max(1.0) as u64;

    let mut frame: u64 = 0;
    while !finished.get() && frame < max_frames {
        animation.update(dt, &mut camera);
        views.constrain(&mut camera);
        frame += 1;

        if frame % report_every == 0 || finished.get() {
            let [yaw, pitch, roll] = camera.euler().to_degrees();
            log::info!(
                "t={:6.2}s yaw={:8.2} pitch={:7.2} roll={:6.2} fov={:6.2}",
                frame as f64 * dt,
                yaw,
                pitch,
                roll,
                camera.fov()
            );

            for hotspot in &config.hotspots {
                match views.world_to_screen(&camera, hotspot.direction(), hotspot.parallax) {
                    Some(p) => log::info!("    {:<12} -> ({:8.1}, {:8.1})", hotspot.name, p.x, p.y),
                    None => log::debug!("    {:<12} -> hidden", hotspot.name),
                }
            }
        }
    }

    if !finished.get() {
        log::warn!("track \"{}\" did not complete within {} frames", uid, max_frames);
    }

    let center = views.viewport().center();
    if let Some(direction) = views.screen_to_world(&camera, center) {
        log::info!("looking at ({:.3}, {:.3}, {:.3})", direction.x, direction.y, direction.z);
    }
    if let Some(uniforms) = views.update_uniforms_data(&camera) {
        log::debug!("uniforms: {:?}", uniforms);
    }

    Ok(())
}
