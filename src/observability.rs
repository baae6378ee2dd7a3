use crate::errors::{BenchError, BenchResult};
use clap::ValueEnum;
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Installs the global subscriber. Logs go to stderr so stdout only carries
/// the report. `CSVBENCH_LOG` takes precedence over the CLI flags.
pub fn init_logging(verbose: bool, quiet: bool, format: LogFormat) {
    let default_level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var("CSVBENCH_LOG")
        .from_env_lossy();

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .with_span_list(false)
                .with_current_span(false)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Process-wide memory and CPU introspection, kept behind a trait so the
/// runner can be driven by a scripted sampler in tests.
pub trait ResourceSampler {
    /// Bytes currently allocated by the process.
    fn current_memory_usage(&self) -> BenchResult<u64>;

    /// Cumulative user + system CPU time of the process, in seconds.
    fn current_cpu_time(&self) -> BenchResult<f64>;
}

/// Samples the running process: jemalloc's `stats.allocated` for memory and
/// `getrusage(RUSAGE_SELF)` for CPU time.
///
/// Memory figures are only meaningful when jemalloc is the global allocator,
/// which the crate's binaries install.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSampler;

impl ProcessSampler {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceSampler for ProcessSampler {
    #[cfg(not(target_env = "msvc"))]
    fn current_memory_usage(&self) -> BenchResult<u64> {
        use tikv_jemalloc_ctl::{epoch, stats};

        // jemalloc caches its statistics until the epoch is advanced.
        epoch::advance().map_err(|e| BenchError::SamplerError(e.to_string()))?;
        let allocated =
            stats::allocated::read().map_err(|e| BenchError::SamplerError(e.to_string()))?;
        Ok(allocated as u64)
    }

    #[cfg(target_env = "msvc")]
    fn current_memory_usage(&self) -> BenchResult<u64> {
        Err(BenchError::SamplerError(
            "allocator statistics are not available on this target".to_string(),
        ))
    }

    #[cfg(unix)]
    fn current_cpu_time(&self) -> BenchResult<f64> {
        let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
        // SAFETY: getrusage only writes into the provided struct.
        let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
        if rc != 0 {
            return Err(BenchError::SamplerError(format!(
                "getrusage failed: {}",
                std::io::Error::last_os_error()
            )));
        }
        // SAFETY: getrusage returned 0, so the struct is initialised.
        let usage = unsafe { usage.assume_init() };
        Ok(timeval_secs(usage.ru_utime) + timeval_secs(usage.ru_stime))
    }

    #[cfg(not(unix))]
    fn current_cpu_time(&self) -> BenchResult<f64> {
        Err(BenchError::SamplerError(
            "process CPU time is not available on this target".to_string(),
        ))
    }
}

#[cfg(unix)]
fn timeval_secs(tv: libc::timeval) -> f64 {
    tv.tv_sec as f64 + tv.tv_usec as f64 / 1e6
}

/// One benchmark run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub duration: Duration,
    /// After minus before. Negative when memory was released mid-run.
    pub memory_delta_bytes: i64,
    pub cpu_delta_secs: f64,
}

impl Measurement {
    /// Whole microseconds expressed in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_micros() as f64 / 1000.0
    }

    pub fn memory_delta_mb(&self) -> f64 {
        self.memory_delta_bytes as f64 / (1024.0 * 1024.0)
    }

    /// CPU-seconds scaled by 100. Historical results logs store this figure in
    /// their "cpu_percent" column, so the scaling is kept even though it is not
    /// a utilisation percentage.
    pub fn cpu_scaled(&self) -> f64 {
        self.cpu_delta_secs * 100.0
    }
}

/// Samples memory and CPU, runs `op` under a wall-clock timer, then samples
/// again. The value produced by `op` stays alive until after the second
/// sample so that retained allocations show up in the memory delta.
pub fn measure<S, F, T>(sampler: &S, op: F) -> BenchResult<Measurement>
where
    S: ResourceSampler + ?Sized,
    F: FnOnce() -> BenchResult<T>,
{
    let memory_before = sampler.current_memory_usage()?;
    let cpu_before = sampler.current_cpu_time()?;

    let start = Instant::now();
    let output = op()?;
    let duration = start.elapsed();

    let memory_after = sampler.current_memory_usage()?;
    let cpu_after = sampler.current_cpu_time()?;
    drop(output);

    Ok(Measurement {
        duration,
        memory_delta_bytes: memory_after as i64 - memory_before as i64,
        cpu_delta_secs: cpu_after - cpu_before,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Every call advances memory by `memory_step` bytes and CPU time by
    /// `cpu_step` seconds.
    pub(crate) struct ScriptedSampler {
        memory: Cell<u64>,
        cpu: Cell<f64>,
        memory_step: u64,
        cpu_step: f64,
    }

    impl ScriptedSampler {
        pub(crate) fn new(memory_step: u64, cpu_step: f64) -> Self {
            Self {
                memory: Cell::new(0),
                cpu: Cell::new(0.0),
                memory_step,
                cpu_step,
            }
        }
    }

    impl ResourceSampler for ScriptedSampler {
        fn current_memory_usage(&self) -> BenchResult<u64> {
            let value = self.memory.get();
            self.memory.set(value + self.memory_step);
            Ok(value)
        }

        fn current_cpu_time(&self) -> BenchResult<f64> {
            let value = self.cpu.get();
            self.cpu.set(value + self.cpu_step);
            Ok(value)
        }
    }

    struct FailingSampler;

    impl ResourceSampler for FailingSampler {
        fn current_memory_usage(&self) -> BenchResult<u64> {
            Err(BenchError::SamplerError("no allocator stats".to_string()))
        }

        fn current_cpu_time(&self) -> BenchResult<f64> {
            Ok(0.0)
        }
    }

    #[test]
    fn test_measure_uses_sampler_deltas() -> BenchResult<()> {
        let sampler = ScriptedSampler::new(1024 * 1024, 0.25);
        let measurement = measure(&sampler, || Ok(vec![0u8; 16]))?;

        assert_eq!(measurement.memory_delta_bytes, 1024 * 1024);
        assert_eq!(measurement.memory_delta_mb(), 1.0);
        assert_eq!(measurement.cpu_delta_secs, 0.25);
        assert_eq!(measurement.cpu_scaled(), 25.0);
        Ok(())
    }

    /// Reports whatever a shared counter currently holds, like an allocator's
    /// live-bytes statistic.
    struct CounterSampler {
        live: Rc<Cell<u64>>,
    }

    impl ResourceSampler for CounterSampler {
        fn current_memory_usage(&self) -> BenchResult<u64> {
            Ok(self.live.get())
        }

        fn current_cpu_time(&self) -> BenchResult<f64> {
            Ok(0.0)
        }
    }

    /// Adds its size to the counter while alive.
    struct Retained {
        live: Rc<Cell<u64>>,
        bytes: u64,
    }

    impl Retained {
        fn new(live: &Rc<Cell<u64>>, bytes: u64) -> Self {
            live.set(live.get() + bytes);
            Self {
                live: Rc::clone(live),
                bytes,
            }
        }
    }

    impl Drop for Retained {
        fn drop(&mut self) {
            self.live.set(self.live.get() - self.bytes);
        }
    }

    #[test]
    fn test_measure_counts_output_retained_until_second_sample() -> BenchResult<()> {
        let live = Rc::new(Cell::new(4096));
        let sampler = CounterSampler {
            live: Rc::clone(&live),
        };

        let measurement = measure(&sampler, || Ok(Retained::new(&live, 3 * 1024 * 1024)))?;

        assert_eq!(measurement.memory_delta_bytes, 3 * 1024 * 1024);
        assert_eq!(live.get(), 4096);
        Ok(())
    }

    #[test]
    fn test_measure_propagates_operation_error() {
        let sampler = ScriptedSampler::new(0, 0.0);
        let result = measure(&sampler, || -> BenchResult<()> {
            Err(BenchError::BenchmarkError("boom".to_string()))
        });
        assert!(matches!(result, Err(BenchError::BenchmarkError(_))));
    }

    #[test]
    fn test_measure_propagates_sampler_error() {
        let result = measure(&FailingSampler, || Ok(()));
        assert!(matches!(result, Err(BenchError::SamplerError(_))));
    }

    #[test]
    fn test_duration_ms_truncates_to_micros() {
        let measurement = Measurement {
            duration: Duration::from_nanos(1_500_999),
            memory_delta_bytes: -2 * 1024 * 1024,
            cpu_delta_secs: 0.0,
        };
        assert_eq!(measurement.duration_ms(), 1.5);
        assert_eq!(measurement.memory_delta_mb(), -2.0);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_cpu_time_is_monotonic() -> BenchResult<()> {
        let sampler = ProcessSampler::new();
        let before = sampler.current_cpu_time()?;
        let mut acc = 0u64;
        for i in 0..200_000u64 {
            acc = acc.wrapping_add(std::hint::black_box(i));
        }
        std::hint::black_box(acc);
        let after = sampler.current_cpu_time()?;
        assert!(after >= before);
        Ok(())
    }
}
