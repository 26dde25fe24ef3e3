use crate::host::Viewport;

/// Picks the surface format and builds the initial surface configuration
/// for `viewport`.
pub fn surface_config(
    adapter: &wgpu::Adapter,
    surface: &wgpu::Surface,
    viewport: Viewport,
) -> wgpu::SurfaceConfiguration {
    let surface_caps = surface.get_capabilities(adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .copied()
        .or_else(|| surface_caps.formats.first().copied())
        .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

    let (width, height) = viewport.physical_size();

    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width,
        height,
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    }
}

/// Applies `viewport` to `config`. Returns whether the surface size changed.
pub fn apply_viewport(config: &mut wgpu::SurfaceConfiguration, viewport: Viewport) -> bool {
    let (width, height) = viewport.physical_size();
    if (config.width, config.height) == (width, height) {
        return false;
    }

    config.width = width;
    config.height = height;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_change_updates_config() {
        let mut config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            width: 800,
            height: 600,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let same = Viewport {
            width: 800,
            height: 600,
            pixel_ratio: 1.0,
        };
        assert!(!apply_viewport(&mut config, same));

        let hidpi = Viewport {
            pixel_ratio: 2.0,
            ..same
        };
        assert!(apply_viewport(&mut config, hidpi));
        assert_eq!((config.width, config.height), (1600, 1200));
    }
}
