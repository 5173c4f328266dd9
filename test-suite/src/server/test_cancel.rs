use super::*;
use crate::*;
use lean_rpc::context::CallContext;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

#[logfn]
#[rstest]
fn test_cancel(runner: TestRunner) {
    let server = Arc::new(new_dispatcher(&[Arc::new(TestService::new(1, ""))]));
    runner.block_on(async move {
        let _server = server.clone();
        let th = tokio::spawn(async move {
            let req = [1, 1, FUNC_WAIT_LONG as u8];
            _server.process_request(&CallContext::new(), &req, vec![]).await
        });

        // make sure it started
        wait_in_flight(&server, 1).await;

        // request id 0, no response to the cancel request itself
        let req = [
            0, // request id
            0, // service id
            1, // function id: cancel
            1, // request id to cancel
        ];
        let resp = server.process_request(&CallContext::new(), &req, vec![]).await;
        assert_eq!(resp, None);

        // the handler ignores its context, but the result is dropped
        let resp = th.await.expect("join");
        assert_eq!(resp, Some(vec![1, 0]));
        assert_eq!(server.in_flight(), 0);
    });
}

#[logfn]
#[rstest]
fn test_cancel_cooperative(runner: TestRunner) {
    let service = Arc::new(TestService::new(1, ""));
    let server = Arc::new(new_dispatcher(&[service.clone()]));
    runner.block_on(async move {
        let _server = server.clone();
        let t0 = Instant::now();
        let th = tokio::spawn(async move {
            let req = [0x20, 42, 1, FUNC_WAIT_CANCELLABLE as u8];
            _server.process_request(&CallContext::new(), &req, vec![7]).await
        });
        wait_in_flight(&server, 1).await;

        // a cancel with a response expected
        let resp = server.process_request(&CallContext::new(), &[2, 0, 1, 0x20, 42], vec![]).await;
        assert_eq!(resp, Some(vec![2, 1]));

        let resp = th.await.expect("join");
        assert_eq!(resp, Some(vec![7, 0x20, 42, 0]));
        assert!(t0.elapsed() < Duration::from_secs(2));
        assert!(service.saw_cancel.load(Ordering::SeqCst));
    });
}

#[logfn]
#[rstest]
fn test_cancel_by_parent_context(runner: TestRunner) {
    let service = Arc::new(TestService::new(1, ""));
    let server = Arc::new(new_dispatcher(&[service.clone()]));
    runner.block_on(async move {
        let parent = CallContext::new();
        let _parent = parent.clone();
        let _server = server.clone();
        let th = tokio::spawn(async move {
            let req = [5, 1, FUNC_WAIT_CANCELLABLE as u8];
            _server.process_request(&_parent, &req, vec![]).await
        });
        wait_in_flight(&server, 1).await;
        parent.cancel();

        // the slot was never consumed by a cancel request, the handler's own error is returned
        let resp = th.await.expect("join");
        assert_eq!(resp, Some(vec![5, 0]));
        assert!(service.saw_cancel.load(Ordering::SeqCst));
        assert_eq!(server.in_flight(), 0);
    });
}

#[logfn]
#[rstest]
fn test_cancel_unknown_request(runner: TestRunner) {
    let server = Arc::new(new_dispatcher(&[Arc::new(TestService::new(1, ""))]));
    runner.block_on(async move {
        let _server = server.clone();
        let th = tokio::spawn(async move {
            let req = [3, 1, FUNC_WAIT_A_LITTLE as u8];
            _server.process_request(&CallContext::new(), &req, vec![]).await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        // wrong target, and a cancel without a target
        let ctx = CallContext::new();
        assert_eq!(server.process_request(&ctx, &[4, 0, 1, 9], vec![]).await, Some(vec![4, 1]));
        assert_eq!(server.process_request(&ctx, &[4, 0, 1], vec![]).await, Some(vec![4, 1]));

        let resp = th.await.expect("join");
        assert_eq!(resp, Some(vec![3, 1]));
    });
}

#[logfn]
#[rstest]
fn test_echo_ignores_cancel(runner: TestRunner) {
    let server = Arc::new(new_dispatcher(&[]));
    runner.block_on(async move {
        let _server = server.clone();
        let th = tokio::spawn(async move {
            let req = [1, 0, 2, 0x20, 150, b'x'];
            _server.process_request(&CallContext::new(), &req, vec![]).await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        // echo never registers, so there is nothing to cancel
        assert_eq!(server.in_flight(), 0);
        assert_eq!(server.process_request(&CallContext::new(), &[0, 0, 1, 1], vec![]).await, None);

        let resp = th.await.expect("join");
        assert_eq!(resp, Some(vec![1, 1, b'x']));
    });
}

#[logfn]
#[rstest]
fn test_concurrent_requests(runner: TestRunner) {
    let service = Arc::new(TestService::new(1, ""));
    let server = Arc::new(new_dispatcher(&[service]));
    runner.block_on(async move {
        let mut ths = Vec::new();
        for i in 1..=20u8 {
            let _server = server.clone();
            ths.push(tokio::spawn(async move {
                let req = [i, 1, FUNC_ADD_NUMS as u8, i, 1];
                _server.process_request(&CallContext::new(), &req, vec![]).await
            }));
        }
        for (i, th) in (1..=20u8).zip(ths) {
            let resp = th.await.expect("join");
            assert_eq!(resp, Some(vec![i, 1, i + 1]));
        }
        assert_eq!(server.in_flight(), 0);
    });
}

#[logfn]
#[rstest]
fn test_dropped_call_releases_slot(runner: TestRunner) {
    let server = new_dispatcher(&[Arc::new(TestService::new(1, ""))]);
    runner.block_on(async move {
        let ctx = CallContext::new();
        for id in 1..=3u8 {
            let req = [id, 1, FUNC_WAIT_CANCELLABLE as u8];
            let res = tokio::time::timeout(
                Duration::from_millis(20),
                server.process_request(&ctx, &req, vec![]),
            )
            .await;
            assert!(res.is_err());
        }
        assert_eq!(server.in_flight(), 0);
        // nothing left to cancel
        assert_eq!(server.process_request(&ctx, &[4, 0, 1, 2], vec![]).await, Some(vec![4, 1]));
        assert!(!ctx.is_cancelled());

        // a dropped call that was cancelled first
        let _server = &server;
        let call = async move {
            let req = [6, 1, FUNC_WAIT_LONG as u8];
            _server.process_request(&CallContext::new(), &req, vec![]).await
        };
        let cancel = async {
            wait_in_flight(&server, 1).await;
            server.process_request(&CallContext::new(), &[0, 0, 1, 6], vec![]).await
        };
        tokio::select! {
            _ = call => panic!("call finished before cancel"),
            resp = cancel => assert_eq!(resp, None),
        }
        assert_eq!(server.in_flight(), 0);
    });
}
