//! RPC Boundary Tests
//!
//! Runs whole clusters in-process: every node gets a real Axum server on an ephemeral
//! loopback port and talks to its neighbors through HTTP call handles.

#[cfg(test)]
mod tests {
    use crate::dispatch::handler::{Handler, LocalWorkFn};
    use crate::dispatch::work::{LocalWork, do_local_work};
    use crate::error::Error;
    use crate::peers::client::{HttpPeer, PeerClient, cluster_client};
    use crate::peers::connector::{NodeContext, Reachability};
    use crate::rpc::handlers::router;
    use crate::rpc::protocol::{ComputeRequest, MAX_PAYLOAD_BYTES, Target};
    use crate::topology::loader::parse_topology;
    use crate::topology::types::{Node, Topology};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    const SAMPLE: &str = include_str!("../../config/topology.json");

    /// Binds every node of `topology` to a fresh port, rewrites the ports, and serves
    /// all nodes in the background. Returns the topology with the real ports.
    async fn spawn_cluster(topology: Topology) -> Topology {
        spawn_cluster_with(topology, do_local_work).await
    }

    async fn spawn_cluster_with(mut topology: Topology, work: LocalWorkFn) -> Topology {
        let mut listeners = Vec::new();
        for node in topology.nodes.iter_mut() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            node.port = listener.local_addr().unwrap().port();
            listeners.push((node.name.clone(), listener));
        }

        let http_client = cluster_client().unwrap();
        for (name, listener) in listeners {
            let ctx = NodeContext::build(&topology, &name, |node| {
                Arc::new(HttpPeer::new(http_client.clone(), node)) as Arc<dyn PeerClient>
            })
            .unwrap();
            let app = router(Arc::new(Handler::new(ctx).with_local_work(work)));

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
        }

        topology
    }

    /// Real local work with a fixed, per-node duration.
    fn fixed_duration_work(payload: &[u8], node_name: &str) -> LocalWork {
        let mut work = do_local_work(payload, node_name);
        work.elapsed_ms = match node_name {
            "B" => 3,
            "C" => 5,
            "E" => 7,
            "F" => 11,
            _ => 1000,
        };
        work
    }

    fn client_for(topology: &Topology, name: &str) -> HttpPeer {
        let node: &Node = topology.node(name).unwrap();
        HttpPeer::new(cluster_client().unwrap(), node)
    }

    #[tokio::test]
    async fn test_five_node_cluster_end_to_end() {
        let topology =
            spawn_cluster_with(parse_topology(SAMPLE).unwrap(), fixed_duration_work).await;
        let leader = client_for(&topology, "A");

        let request = ComputeRequest {
            request_id: "r1".to_string(),
            target: Target::Both,
            payload: vec![0u8; 64],
        };
        let result = leader
            .call(&request, Duration::from_secs(5))
            .await
            .expect("cluster should answer");

        assert_eq!(result.request_id, "r1");
        // B + C + E + F; the leader does no local work
        assert_eq!(result.compute_ms, 3 + 5 + 7 + 11);

        let mut expected = Vec::new();
        for name in ["B", "C", "E", "F"] {
            expected.extend(do_local_work(&request.payload, name).data);
        }
        assert_eq!(
            String::from_utf8(result.data).unwrap(),
            String::from_utf8(expected).unwrap()
        );
    }

    #[tokio::test]
    async fn test_largest_payload_is_accepted() {
        let mut topology = parse_topology(SAMPLE).unwrap();
        topology.nodes.retain(|n| n.name == "C");
        topology.nodes[0].neighbors.clear();
        let topology = spawn_cluster(topology).await;

        // 255 is the widest byte in the JSON encoding
        let request = ComputeRequest {
            request_id: "big".to_string(),
            target: Target::Both,
            payload: vec![255u8; MAX_PAYLOAD_BYTES],
        };
        let worker = client_for(&topology, "C");
        let result = worker
            .call(&request, Duration::from_secs(60))
            .await
            .expect("payload within the limit must be accepted");

        assert_eq!(result.data, do_local_work(&request.payload, "C").data);
    }

    #[tokio::test]
    async fn test_green_only_request_stays_in_green_subtree() {
        let topology = spawn_cluster(parse_topology(SAMPLE).unwrap()).await;
        let leader = client_for(&topology, "A");

        let request = ComputeRequest {
            request_id: "green".to_string(),
            target: Target::Green,
            payload: vec![7u8; 16],
        };
        let result = leader.call(&request, Duration::from_secs(5)).await.unwrap();

        let text = String::from_utf8(result.data).unwrap();
        assert!(text.starts_with("node=B;"));
        assert!(text.contains("node=C;"));
        assert!(!text.contains("node=E;"));
        assert!(!text.contains("node=F;"));
    }

    #[tokio::test]
    async fn test_health_endpoint_and_probe() {
        let topology = spawn_cluster(parse_topology(SAMPLE).unwrap()).await;

        let reply = client_for(&topology, "E")
            .probe(Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(reply.node, "E");

        let ctx = NodeContext::build(&topology, "A", |node| {
            Arc::new(HttpPeer::new(cluster_client().unwrap(), node)) as Arc<dyn PeerClient>
        })
        .unwrap();
        let report = ctx.probe_peers(Duration::from_secs(2)).await;
        assert!(report.values().all(|r| *r == Reachability::Reachable));
    }

    #[tokio::test]
    async fn test_leader_failure_crosses_the_wire_as_unavailable() {
        // Only A is served; both team leaders point at dead ports
        let mut topology = parse_topology(SAMPLE).unwrap();
        topology.nodes.retain(|n| n.name == "A" || n.name == "B" || n.name == "E");
        for node in topology.nodes.iter_mut() {
            let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
            node.port = closed.local_addr().unwrap().port();
        }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let a = topology.nodes.iter_mut().find(|n| n.name == "A").unwrap();
        a.port = listener.local_addr().unwrap().port();

        let ctx = NodeContext::build(&topology, "A", |node| {
            Arc::new(HttpPeer::new(cluster_client().unwrap(), node)) as Arc<dyn PeerClient>
        })
        .unwrap();
        let app = router(Arc::new(Handler::new(ctx)));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let request = ComputeRequest {
            request_id: "doomed".to_string(),
            target: Target::Both,
            payload: vec![],
        };
        let result = client_for(&topology, "A")
            .call(&request, Duration::from_secs(5))
            .await;

        assert_eq!(
            result.err(),
            Some(Error::Unavailable("no team succeeded".to_string()))
        );
    }

    #[tokio::test]
    async fn test_overload_crosses_the_wire_as_resource_exhausted() {
        let mut topology = parse_topology(SAMPLE).unwrap();
        topology.nodes.retain(|n| n.name == "B");
        let b = &mut topology.nodes[0];
        b.max_inflight = 1;
        b.neighbors.clear();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        b.port = listener.local_addr().unwrap().port();

        let ctx = NodeContext::build(&topology, "B", |node| {
            Arc::new(HttpPeer::new(cluster_client().unwrap(), node)) as Arc<dyn PeerClient>
        })
        .unwrap();
        let handler = Arc::new(Handler::new(ctx));

        // Occupy the only slot directly, then call over HTTP
        let held = handler.clone();
        let app = router(handler);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let _guard = held_slot(&held);
        let result = client_for(&topology, "B")
            .call(
                &ComputeRequest {
                    request_id: "busy".to_string(),
                    target: Target::Green,
                    payload: vec![],
                },
                Duration::from_secs(5),
            )
            .await;

        assert_eq!(result.err(), Some(Error::ResourceExhausted));
    }

    fn held_slot(handler: &Handler) -> crate::dispatch::admission::InflightPermit<'_> {
        handler.admission().admit(1).unwrap()
    }
}
