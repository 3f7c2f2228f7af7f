//! CPAL output backend: mixes voice buses into the device stream.

use crate::bus::BusRenderer;
use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{info, warn};

/// Wrapper to hold `cpal::Stream` in a `Send` context.
///
/// # Safety
/// `cpal::Stream` is `!Send` due to platform internals. The stream is only
/// created, kept alive and dropped by its owning `AudioOutput`; nothing else
/// touches it.
struct StreamHandle(#[allow(dead_code)] cpal::Stream);

unsafe impl Send for StreamHandle {}

/// An opened output device plus the buses mixed into it.
pub struct AudioOutput {
    device: cpal::Device,
    /// Config read at `open`; the stream is built from this same config so it
    /// always matches `channels()`.
    config: cpal::SupportedStreamConfig,
    sample_rate: f64,
    channels: usize,
    bus_sender: Sender<BusRenderer>,
    bus_receiver: Option<Receiver<BusRenderer>>,
    _stream: Option<StreamHandle>,
}

impl AudioOutput {
    /// Open the named output device, or the host default when `device` is `None`.
    ///
    /// An unknown name (or a host with no default) is `DeviceNotFound`.
    pub fn open(device: Option<&str>) -> Result<Self> {
        let handle = get_device(device)?;
        let config = handle.default_output_config()?;
        let (bus_sender, bus_receiver) = unbounded();

        info!(
            device = handle.name().unwrap_or_default(),
            channels = config.channels(),
            sample_rate = config.sample_rate().0,
            "opened audio output"
        );

        Ok(Self {
            sample_rate: config.sample_rate().0 as f64,
            channels: config.channels() as usize,
            device: handle,
            config,
            bus_sender,
            bus_receiver: Some(bus_receiver),
            _stream: None,
        })
    }

    pub fn list_devices() -> Result<Vec<String>> {
        cpal::default_host()
            .output_devices()?
            .map(|d| Ok(d.name()?))
            .collect()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Physical channel count reported by the device.
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn is_running(&self) -> bool {
        self._stream.is_some()
    }

    /// Hand a bus to the audio callback. Buses added before `start` are picked
    /// up on the first callback.
    pub fn add_bus(&self, renderer: BusRenderer) {
        if self.bus_sender.send(renderer).is_err() {
            warn!("audio callback is gone, bus dropped");
        }
    }

    pub fn start(&mut self) -> Result<()> {
        let Some(receiver) = self.bus_receiver.take() else {
            return Ok(());
        };

        let device = &self.device;
        let config = self.config.config();

        let stream = match self.config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(device, &config, receiver)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(device, &config, receiver)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(device, &config, receiver)?,
            format => {
                return Err(Error::InvalidConfig(format!(
                    "Unsupported sample format: {format:?}"
                )));
            }
        };

        stream.play()?;
        self._stream = Some(StreamHandle(stream));

        Ok(())
    }
}

fn get_device(name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match name {
        Some(wanted) => host
            .output_devices()?
            .find(|d| d.name().is_ok_and(|n| n == wanted))
            .ok_or_else(|| Error::DeviceNotFound(wanted.to_owned())),
        None => host
            .default_output_device()
            .ok_or_else(|| Error::DeviceNotFound("no default output device".into())),
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    receiver: Receiver<BusRenderer>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;

    // Grows on the first callback, then stable
    let mut mix = Vec::<f32>::new();
    let mut buses: Vec<BusRenderer> = Vec::with_capacity(16);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let result = catch_unwind(AssertUnwindSafe(|| {
                while let Ok(bus) = receiver.try_recv() {
                    buses.push(bus);
                }
                buses.retain(|bus| !bus.is_closed());

                if mix.len() < data.len() {
                    mix.resize(data.len(), 0.0);
                }
                let block = &mut mix[..data.len()];
                block.fill(0.0);

                for bus in buses.iter_mut() {
                    bus.render_add(block, channels);
                }
                write_output(data, block);
            }));

            if result.is_err() {
                output_silence(data);
            }
        },
        |err| warn!("audio stream error: {err}"),
        None,
    )?;

    Ok(stream)
}

/// Convert the f32 mix to the device format.
#[inline]
fn write_output<T: cpal::SizedSample + cpal::FromSample<f32>>(data: &mut [T], mix: &[f32]) {
    for (sample, value) in data.iter_mut().zip(mix) {
        *sample = T::from_sample(value.clamp(-1.0, 1.0));
    }
}

/// Output silence (panic recovery).
#[inline]
fn output_silence<T: cpal::SizedSample + cpal::FromSample<f32>>(data: &mut [T]) {
    for sample in data.iter_mut() {
        *sample = T::from_sample(0.0);
    }
}
