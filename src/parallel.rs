//! Campaign runner: scans many input sequences against one shared pattern.
//! A producer thread feeds a bounded channel, each worker owns a reusable
//! `ApatSeq`, and a consumer closure drains results in arrival order.

use crate::pattern::Pattern;
use crate::search::manber_all;
use crate::seq::ApatSeq;
use crossbeam_channel::{bounded, Receiver};
use scoped_threadpool::Pool;
use std::sync::Arc;

/// One sequence handed to a campaign.
#[derive(Debug, Clone)]
pub struct SeqInput {
    pub name: String,
    pub text: Vec<u8>,
    pub circular: bool,
}

pub struct ParallelResult<P>
where
    P: Send,
{
    recv: Receiver<P>,
}

impl<P> ParallelResult<P>
where
    P: Send,
{
    #[inline]
    pub fn next(&mut self) -> Option<P> {
        self.recv.recv().ok()
    }
}

/// Runs `work` on every input after scanning it with `pattern`; `func`
/// consumes the per-sequence outputs. Workers swallow per-sequence scan
/// errors into `None` so one bad input does not sink the campaign.
pub fn scan_parallel<S, O, W, F, Out>(
    source: S,
    pattern: &Pattern,
    n_threads: usize,
    buffer_len: usize,
    work: W,
    func: F,
) -> Out
where
    S: Iterator<Item = SeqInput> + Send,
    O: Send,
    Out: Send,
    W: Send + Sync + Fn(&SeqInput, &mut ApatSeq) -> O,
    F: FnOnce(&mut ParallelResult<Option<O>>) -> Out + Send,
{
    assert!(n_threads > 2);
    assert!(n_threads <= buffer_len);
    let (sender, receiver) = bounded::<SeqInput>(buffer_len);
    let (done_send, done_recv) = bounded::<Option<O>>(buffer_len);
    let receiver = Arc::new(receiver);
    let done_send = Arc::new(done_send);
    let mut pool = Pool::new(n_threads as u32);

    let mut parallel_result = ParallelResult { recv: done_recv };
    let mut out = None;

    pool.scoped(|pool_scope| {
        pool_scope.execute(move || {
            for input in source {
                sender.send(input).expect("Failed to send sequences");
            }
        });

        for _ in 0..n_threads - 2 {
            let receiver = Arc::clone(&receiver);
            let done_send = Arc::clone(&done_send);
            let work = &work;
            pool_scope.execute(move || {
                let mut seq = ApatSeq::default();
                while let Ok(input) = receiver.recv() {
                    seq.encode(&input.text, input.circular);
                    let len = seq.data_len();
                    let output = match manber_all(&mut seq, pattern, 0, len) {
                        Ok(_) => Some(work(&input, &mut seq)),
                        Err(_) => None,
                    };
                    done_send.send(output).expect("Failed to send outputs");
                }
            });
        }

        // drop our clone so the consumer sees the channel close once every
        // worker is done
        drop(done_send);
        let out = &mut out;
        pool_scope.execute(move || {
            *out = Some(func(&mut parallel_result));
        });

        pool_scope.join_all();
    });

    out.expect("consumer thread did not run")
}
