use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{RenderError, Result};

use super::GpuInit;

/// Owns the wgpu core objects: instance, adapter, device and the single
/// submission queue.
///
/// Created once at startup and held for the process lifetime. Everything else
/// (shader programs, pipeline states, meshes, frame batches) is created
/// through it and only borrows it.
pub struct DeviceContext {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Set by the device-lost callback.
    lost: Arc<AtomicBool>,
}

impl DeviceContext {
    /// Creates the instance used for both the adapter and any window surface.
    pub fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    }

    /// Selects an adapter and creates the device + queue.
    ///
    /// `compatible_surface` restricts adapter selection to one that can present
    /// to that surface. Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
        init: &GpuInit,
    ) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .map_err(|e| RenderError::NoGpuAvailable(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("using GPU adapter \"{}\" ({:?})", info.name, info.backend);

        let required_features =
            init.required_features | (init.optional_features & adapter.features());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prism device"),
                required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| RenderError::QueueCreationFailed(e.to_string()))?;

        let lost = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&lost);
        device.set_device_lost_callback(move |reason, message| {
            match reason {
                wgpu::DeviceLostReason::Destroyed => log::debug!("GPU device destroyed"),
                _ => log::error!("GPU device lost ({reason:?}): {message}"),
            }
            flag.store(true, Ordering::Release);
        });

        // Errors outside a validation scope are logged instead of panicking.
        device.on_uncaptured_error(Arc::new(|err: wgpu::Error| {
            log::error!("uncaptured wgpu error: {err}");
        }));

        log::debug!("device features: {:?}", device.features());

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            lost,
        })
    }

    /// Blocking, surface-less variant of [`DeviceContext::new`].
    pub fn headless(init: &GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(Self::create_instance(), None, init))
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the submission queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns `true` when every feature in `features` is enabled on the device.
    pub fn supports(&self, features: wgpu::Features) -> bool {
        self.device.features().contains(features)
    }

    /// Runs `create` inside a validation error scope.
    ///
    /// Returns the created object, or the validation error wgpu raised while
    /// creating it.
    pub fn validated<T>(
        &self,
        create: impl FnOnce(&wgpu::Device) -> T,
    ) -> std::result::Result<T, wgpu::Error> {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create(&self.device);
        match pollster::block_on(scope.pop()) {
            Some(err) => Err(err),
            None => Ok(value),
        }
    }

    /// Returns `true` once the device has been reported lost.
    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }
}
