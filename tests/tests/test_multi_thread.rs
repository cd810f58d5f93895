// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::sync::Arc;
use std::thread;

use tether::{ReferencePolicy, Value};
use tests::{build_graph, new_tether, node_type};

#[test]
fn test_shared_tether_across_threads() {
    let tether = Arc::new(new_tether(ReferencePolicy::AllDuplicates));
    let mut handles = vec![];
    for size in 1..=6usize {
        let tether = Arc::clone(&tether);
        let handle = thread::spawn(move || {
            // a ring of `size` nodes
            let edges: Vec<Vec<usize>> = (0..size).map(|i| vec![(i + 1) % size]).collect();
            let (heap, ids) = build_graph(&edges);
            let root = Value::Object(ids[0]);
            let text = tether.serialize(&heap, &root, &node_type()).unwrap();
            let (copy, value) = tether.deserialize(&text, &node_type()).unwrap();
            assert!(heap.isomorphic(&root, &copy, &value));
            copy.len()
        });
        handles.push(handle);
    }
    for (i, handle) in handles.into_iter().enumerate() {
        // one record and one connections list per node
        assert_eq!(handle.join().unwrap(), 2 * (i + 1));
    }
}
