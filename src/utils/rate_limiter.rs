/// Token bucket rate limiter shared by every upstream request
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Bucket {
    tokens: u32,
    last_refill: Instant,
}

pub struct RateLimiter {
    capacity: u32,
    refill_interval: Duration,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// `capacity` requests per `refill_interval`; the bucket starts full
    pub fn new(capacity: u32, refill_interval: Duration) -> Self {
        RateLimiter {
            capacity,
            refill_interval,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn per_second(requests_per_second: u32) -> Self {
        Self::new(requests_per_second, Duration::from_secs(1))
    }

    /// Try to acquire a token, returns true if successful
    pub async fn try_acquire(&self) -> bool {
        let mut bucket = self.bucket.lock().await;
        self.refill(&mut bucket);

        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Wait until a token is available, then acquire it
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                self.refill(&mut bucket);

                if bucket.tokens > 0 {
                    bucket.tokens -= 1;
                    return;
                }

                // Sleep until the next refill boundary
                self.refill_interval
                    .saturating_sub(bucket.last_refill.elapsed())
                    .max(Duration::from_millis(1))
            };

            tokio::time::sleep(wait).await;
        }
    }

    /// Refill tokens based on elapsed time
    fn refill(&self, bucket: &mut Bucket) {
        if self.refill_interval.is_zero() {
            bucket.tokens = self.capacity;
            return;
        }

        let elapsed = bucket.last_refill.elapsed();
        if elapsed >= self.refill_interval {
            let periods = (elapsed.as_secs_f64() / self.refill_interval.as_secs_f64()) as u32;
            bucket.tokens = bucket.tokens.saturating_add(periods.saturating_mul(self.capacity)).min(self.capacity);
            // Keep the fractional remainder so pacing does not drift
            bucket.last_refill += self.refill_interval * periods;
        }
    }
}
