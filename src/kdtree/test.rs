use crate::kdtree::traversal::Node;
use crate::kdtree::{
    sq_dist, BBox, KdTree, KdTreeBuilder, KdTreeIndex, KdTreeOptions, SelectionStrategy,
};
use crate::r#type::IndexableNum;
use crate::test::{
    init_logger, radius_filter, random_grid_points, random_points, range_filter, sorted,
    sorted_dists,
};

fn points() -> Vec<[f64; 2]> {
    let coords: Vec<[i32; 2]> = vec![
        [54, 1],
        [97, 21],
        [65, 35],
        [33, 54],
        [95, 39],
        [54, 3],
        [53, 54],
        [84, 72],
        [33, 34],
        [43, 15],
        [52, 83],
        [81, 23],
        [1, 61],
        [38, 74],
        [11, 91],
        [24, 56],
        [90, 31],
        [25, 57],
        [46, 61],
        [29, 69],
        [49, 60],
        [4, 98],
        [71, 15],
        [60, 25],
        [38, 84],
        [52, 38],
        [94, 51],
        [13, 25],
        [77, 73],
        [88, 87],
        [6, 27],
        [58, 22],
        [53, 28],
        [27, 91],
        [96, 98],
        [93, 14],
        [22, 93],
        [45, 94],
        [18, 28],
        [35, 15],
        [19, 81],
        [20, 81],
        [67, 53],
        [43, 3],
        [47, 66],
        [48, 34],
        [46, 12],
        [32, 38],
        [43, 12],
        [39, 94],
        [88, 62],
        [66, 14],
        [84, 30],
        [72, 81],
        [41, 92],
        [26, 4],
        [6, 76],
        [47, 21],
        [57, 70],
        [71, 82],
        [50, 68],
        [96, 18],
        [40, 31],
        [78, 53],
        [71, 90],
        [32, 14],
        [55, 6],
        [32, 88],
        [62, 32],
        [21, 67],
        [73, 81],
        [44, 64],
        [29, 50],
        [70, 5],
        [6, 22],
        [68, 3],
        [11, 23],
        [20, 42],
        [21, 73],
        [63, 86],
        [9, 40],
        [99, 2],
        [99, 76],
        [56, 77],
        [83, 6],
        [21, 72],
        [78, 30],
        [75, 53],
        [41, 11],
        [95, 20],
        [30, 38],
        [96, 82],
        [65, 48],
        [33, 18],
        [87, 28],
        [10, 10],
        [40, 34],
        [10, 20],
        [47, 29],
        [46, 78],
    ];

    coords
        .into_iter()
        .map(|[x, y]| [x.into(), y.into()])
        .collect()
}

fn make_index() -> KdTree<f64, 2> {
    init_logger();
    let points = points();

    let mut builder = KdTreeBuilder::new(points.len());
    for point in points {
        builder.add(point);
    }
    builder.finish()
}

fn small_index() -> KdTree<f64, 2> {
    KdTree::from_points([[0., 0.], [1., 1.], [2., 2.], [0., 2.]])
}

/// Points held by the given indices, sorted.
fn resolve<N: IndexableNum, const K: usize, P>(tree: &KdTree<N, K, P>, ids: &[usize]) -> Vec<[N; K]> {
    let mut points: Vec<[N; K]> = ids.iter().map(|&i| *tree.point(i)).collect();
    points.sort_by(|a, b| a.partial_cmp(b).unwrap());
    points
}

/// Check every structural invariant of the subtree under `node`, returning its exact bounds.
fn check_subtree<N: IndexableNum, const K: usize, P>(
    node: Node<'_, N, K, P>,
    depth: usize,
    count: &mut usize,
) -> BBox<N, K> {
    *count += 1;
    assert_eq!(node.axis(), depth % K, "axis rotates with depth");

    let mut exact = BBox::from_point(node.point());
    let axis = node.axis();
    let split = node.point()[axis];

    if let Some(left) = node.left_child() {
        let child = check_subtree(left, depth + 1, count);
        assert!(child.hi[axis] <= split, "left subtree is not larger on the split axis");
        exact.expand(&child);
    }
    if let Some(right) = node.right_child() {
        let child = check_subtree(right, depth + 1, count);
        assert!(child.lo[axis] >= split, "right subtree is not smaller on the split axis");
        exact.expand(&child);
    }

    assert_eq!(node.bbox(), &exact, "bounding box is tight");
    exact
}

fn check_tree<N: IndexableNum, const K: usize, P>(tree: &KdTree<N, K, P>) {
    let mut count = 0;
    if let Some(root) = tree.root() {
        check_subtree(root, 0, &mut count);
    }
    assert_eq!(count, tree.size(), "every item is held by exactly one node");
    assert_eq!(tree.nodes().len(), tree.size());
}

fn expected_depth(n: usize) -> usize {
    (usize::BITS - n.leading_zeros()) as usize
}

#[test]
fn nearest_of_small_set() {
    let tree = small_index();
    let nearest = tree.nearest(&[5., 5.]).unwrap();
    assert_eq!(tree.point(nearest.index), &[2., 2.]);
    assert_eq!(nearest.dist2, 18.);
}

#[test]
fn range_of_small_set() {
    let tree = small_index();
    let result = tree.range_search(&[0., 0.], &[1., 2.]);
    assert_eq!(
        resolve(&tree, &result),
        vec![[0., 0.], [0., 2.], [1., 1.]]
    );
}

#[test]
fn radius_of_small_set() {
    let tree = small_index();
    let result = tree.radius_search(&[0., 0.], 1.5);
    assert_eq!(resolve(&tree, &result), vec![[0., 0.], [1., 1.]]);
}

#[test]
fn creates_an_index() {
    let tree = make_index();
    assert_eq!(tree.size(), 100);
    assert_eq!(tree.depth(), 7);
    check_tree(&tree);

    // building only reorders the items
    let mut expected = points();
    expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let all: Vec<usize> = (0..tree.size()).collect();
    assert_eq!(resolve(&tree, &all), expected);
}

#[test]
fn range_search() {
    let tree = make_index();

    let min = [20., 30.];
    let max = [50., 70.];

    let result = tree.range_search(&min, &max);
    assert_eq!(result.len(), 18, "returns ids");
    assert_eq!(sorted(result), range_filter(&tree, &min, &max));
}

#[test]
fn radius_search() {
    let tree = make_index();

    let q = [50., 50.];
    let r = 20.;

    let result = tree.radius_search(&q, r);
    assert_eq!(result.len(), 12, "returns ids");
    assert_eq!(sorted(result), radius_filter(&tree, &q, r * r));
}

#[test]
fn knn_on_fixture() {
    let tree = make_index();
    let q = [50., 50.];

    let result = tree.knn(&q, 5);
    let dists: Vec<f64> = result.iter().map(|n| n.dist2).collect();
    assert_eq!(dists, sorted_dists(&tree, &q)[..5].to_vec());
    for n in &result {
        assert_eq!(sq_dist(tree.point(n.index), &q), n.dist2);
    }
}

#[test]
fn empty_tree() {
    let tree = KdTree::<f64, 3>::from_points(Vec::new());
    assert_eq!(tree.size(), 0);
    assert!(tree.is_empty());
    assert!(tree.root().is_none());
    assert_eq!(tree.root_index(), None);
    assert_eq!(tree.depth(), 0);

    let q = [1., 2., 3.];
    assert_eq!(tree.nearest(&q), None);
    assert!(tree.knn(&q, 4).is_empty());
    assert!(tree.range_search(&[0., 0., 0.], &[9., 9., 9.]).is_empty());
    assert!(tree.radius_search(&q, 100.).is_empty());

    let default: KdTree<u8, 2> = KdTree::default();
    assert!(default.is_empty());
    assert_eq!(default.nearest(&[0, 0]), None);
}

#[test]
fn single_item() {
    let tree = KdTree::<i16, 2>::from_points([[-4, 7]]);
    assert_eq!(tree.depth(), 1);
    assert!(tree.root().unwrap().is_leaf());
    let nearest = tree.nearest(&[0, 0]).unwrap();
    assert_eq!(nearest.index, 0);
    assert_eq!(nearest.dist2, 65);
    assert_eq!(tree.knn(&[0, 0], 10).len(), 1);
}

#[test]
fn knn_clamps_k() {
    let tree = small_index();
    assert!(tree.knn(&[0., 0.], 0).is_empty());

    let all = tree.knn(&[0., 0.], 100);
    assert_eq!(all.len(), 4);
    let dists: Vec<f64> = all.iter().map(|n| n.dist2).collect();
    assert_eq!(dists, vec![0., 2., 4., 8.]);
}

#[test]
fn knn_orders_ties_by_index() {
    // four corners at the same distance from the center
    let tree = KdTree::<i32, 2>::from_points([[1, 1], [-1, 1], [1, -1], [-1, -1], [0, 0]]);
    let result = tree.knn(&[0, 0], 5);
    assert_eq!(result[0].dist2, 0);
    let ties: Vec<usize> = result[1..].iter().map(|n| n.index).collect();
    assert_eq!(ties, sorted(ties.clone()));
    assert!(result[1..].iter().all(|n| n.dist2 == 2));

    // the cut falls inside the tie: any two corners are acceptable, still listed by index
    let result = tree.knn(&[0, 0], 3);
    assert_eq!(result.iter().map(|n| n.dist2).collect::<Vec<_>>(), vec![0, 2, 2]);
    assert!(result[1].index < result[2].index);
    assert!(result[1..].iter().all(|n| tree.point(n.index) != &[0, 0]));
}

#[test]
fn matches_brute_force_f64_3d() {
    init_logger();
    let points = random_points::<3>(7, 2000, 100.);
    let queries = random_points::<3>(8, 50, 120.);

    for selection in [SelectionStrategy::FloydRivest, SelectionStrategy::Introselect] {
        let options = KdTreeOptions::default().with_selection(selection);
        let tree = KdTree::<f64, 3>::from_points_with_options(points.clone(), options);
        check_tree(&tree);
        assert_eq!(tree.depth(), expected_depth(points.len()));

        for q in &queries {
            let brute = sorted_dists(&tree, q);

            let nearest = tree.nearest(q).unwrap();
            assert_eq!(nearest.dist2, brute[0]);
            assert_eq!(sq_dist(tree.point(nearest.index), q), nearest.dist2);

            for k in [1, 7, 64] {
                let dists: Vec<f64> = tree.knn(q, k).iter().map(|n| n.dist2).collect();
                assert_eq!(dists, brute[..k].to_vec());
            }

            let lo = [q[0] - 25., q[1] - 10., q[2] - 40.];
            let hi = [q[0] + 15., q[1] + 30., q[2] + 5.];
            assert_eq!(
                sorted(tree.range_search(&lo, &hi)),
                range_filter(&tree, &lo, &hi)
            );

            let r = 18.5;
            assert_eq!(
                sorted(tree.radius_search(q, r)),
                radius_filter(&tree, q, r * r)
            );
        }
    }
}

#[test]
fn matches_brute_force_with_duplicates() {
    let points = random_grid_points::<2>(11, 1500, 12);
    let queries = random_grid_points::<2>(12, 40, 14);

    for selection in [SelectionStrategy::FloydRivest, SelectionStrategy::Introselect] {
        let mut builder =
            KdTreeBuilder::<i32, 2>::new_with_options(points.len(), KdTreeOptions { selection });
        for p in &points {
            builder.add(*p);
        }
        let tree = builder.finish();
        check_tree(&tree);

        for q in &queries {
            let brute = sorted_dists(&tree, q);
            assert_eq!(tree.nearest(q).unwrap().dist2, brute[0]);

            let knn = tree.knn(q, 25);
            let dists: Vec<i128> = knn.iter().map(|n| n.dist2).collect();
            assert_eq!(dists, brute[..25].to_vec());
            for pair in knn.windows(2) {
                if pair[0].dist2 == pair[1].dist2 {
                    assert!(pair[0].index < pair[1].index);
                }
            }

            let lo = [q[0] - 2, q[1] - 3];
            let hi = [q[0] + 1, q[1]];
            assert_eq!(
                sorted(tree.range_search(&lo, &hi)),
                range_filter(&tree, &lo, &hi)
            );

            // radius 2.5 is not an integer; use the squared radius directly
            assert_eq!(
                sorted(tree.radius_search_squared(q, 6)),
                radius_filter(&tree, q, 6)
            );
        }
    }
}

#[test]
fn unsigned_extremes_do_not_overflow() {
    let tree = KdTree::<u8, 2>::from_points([[0, 0], [255, 255], [255, 0]]);
    let nearest = tree.nearest(&[0, 255]).unwrap();
    assert_eq!(nearest.dist2, 255 * 255);

    let far = tree.knn(&[0, 0], 3);
    assert_eq!(far[2].dist2, 2 * 255 * 255);
    assert_eq!(tree.point(far[2].index), &[255, 255]);

    let all = tree.radius_search(&[128, 128], 255);
    assert_eq!(all.len(), 3);
}

#[test]
fn wide_integer_extremes_do_not_overflow() {
    let top = u64::MAX;
    let span: u64 = 1 << 62;
    let tree = KdTree::<u64, 2>::from_points([
        [top, top],
        [top - span, top],
        [top, top - span],
        [top - span, top - span],
    ]);
    check_tree(&tree);

    let nearest = tree.nearest(&[top - span, top - span]).unwrap();
    assert_eq!(nearest.dist2, 0);
    assert_eq!(tree.point(nearest.index), &[top - span, top - span]);

    let span2 = i128::from(span) * i128::from(span);
    let all = tree.knn(&[top, top], 4);
    assert_eq!(
        all.iter().map(|n| n.dist2).collect::<Vec<_>>(),
        vec![0, span2, span2, 2 * span2]
    );
    assert_eq!(tree.radius_search(&[top, top], span).len(), 3);

    let step = 1i64 << 62;
    let tree = KdTree::<i64, 2>::from_points([
        [i64::MIN, i64::MAX],
        [i64::MIN + step, i64::MAX - step],
        [i64::MIN + step, i64::MAX],
    ]);
    let nearest = tree.nearest(&[i64::MIN, i64::MAX - 5]).unwrap();
    assert_eq!(nearest.dist2, 25);
    assert_eq!(tree.point(nearest.index), &[i64::MIN, i64::MAX]);
    assert_eq!(
        sorted(tree.range_search(&[i64::MIN, 0], &[0, i64::MAX])),
        sorted(range_filter(&tree, &[i64::MIN, 0], &[0, i64::MAX]))
    );
}

#[test]
fn f32_coordinates() {
    let points = random_points::<4>(21, 300, 1e3);
    let tree = KdTree::<f32, 4>::from_iter_with(points.iter(), |p| p.map(|c| c as f32));
    check_tree(&tree);

    let q = [1.5f32, -2.0, 3.25, 0.0];
    assert_eq!(tree.nearest(&q).unwrap().dist2, sorted_dists(&tree, &q)[0]);
}

#[test]
fn payloads_stay_attached() {
    let points = random_points::<2>(3, 500, 10.);
    let tree = KdTree::from_items(points.iter().enumerate().map(|(i, p)| (*p, i)));

    for (_, point, original) in tree.store().iter() {
        assert_eq!(point, &points[*original]);
    }

    let q = [0.5, -0.5];
    let nearest = tree.nearest(&q).unwrap();
    let (point, original) = tree.item(nearest.index);
    assert_eq!(point, &points[*original]);
    assert_eq!(tree.payload(nearest.index), original);
}

#[test]
fn rebuild_keeps_query_results() {
    let points = random_grid_points::<3>(5, 400, 6);
    let mut tree = KdTree::from_iter_with_payload(points.iter().enumerate(), |(i, p)| (*p, i));
    let q = [3, 3, 3];
    let lo = [1, 0, 2];
    let hi = [4, 5, 3];

    let payloads_of = |tree: &KdTree<i32, 3, usize>, ids: Vec<usize>| {
        let mut payloads: Vec<usize> = ids.into_iter().map(|i| *tree.payload(i)).collect();
        payloads.sort_unstable();
        payloads
    };

    let before_range = payloads_of(&tree, tree.range_search(&lo, &hi));
    let before_radius = payloads_of(&tree, tree.radius_search(&q, 2));
    let before_nearest = tree.nearest(&q).unwrap().dist2;

    tree.build();
    check_tree(&tree);
    assert_eq!(payloads_of(&tree, tree.range_search(&lo, &hi)), before_range);
    assert_eq!(payloads_of(&tree, tree.radius_search(&q, 2)), before_radius);
    assert_eq!(tree.nearest(&q).unwrap().dist2, before_nearest);

    tree.rebuild_with_options(KdTreeOptions::default().with_selection(SelectionStrategy::Introselect));
    assert_eq!(tree.options().selection, SelectionStrategy::Introselect);
    check_tree(&tree);
    assert_eq!(payloads_of(&tree, tree.range_search(&lo, &hi)), before_range);
}

#[test]
fn interleaved_constructor() {
    let tree = KdTree::<f64, 2>::from_interleaved(&[0., 0., 1., 1., 2., 2., 0., 2.]).unwrap();
    assert_eq!(tree.size(), 4);
    assert_eq!(tree.store().coords().len(), 8);
    assert!(KdTree::<f64, 3>::from_interleaved(&[0., 0.]).is_err());
}

#[test]
fn into_items_returns_everything() {
    let tree = KdTree::from_items([([3u16, 1], 'a'), ([1, 2], 'b'), ([2, 3], 'c')]);
    let mut items: Vec<([u16; 2], char)> = tree.into_items().collect();
    items.sort_by_key(|(_, c)| *c);
    assert_eq!(items, vec![([3, 1], 'a'), ([1, 2], 'b'), ([2, 3], 'c')]);
}

#[test]
fn geo_traits_inputs() {
    let tree = small_index();
    let nearest = tree.nearest_coord(&(5., 5.)).unwrap();
    assert_eq!(tree.point(nearest.index), &[2., 2.]);

    let within = tree.radius_search_coord(&(0., 0.), 1.5);
    assert_eq!(resolve(&tree, &within), vec![[0., 0.], [1., 1.]]);

    assert_eq!(tree.knn_coord(&(0., 0.), 2).len(), 2);
}

#[test]
fn concurrent_queries() {
    let points = random_points::<2>(99, 1000, 50.);
    let tree = KdTree::<f64, 2>::from_points(points);
    let queries = random_points::<2>(100, 8, 50.);

    std::thread::scope(|s| {
        let handles: Vec<_> = queries
            .iter()
            .map(|q| {
                let tree = &tree;
                s.spawn(move || tree.nearest(q).unwrap().dist2)
            })
            .collect();
        for (handle, q) in handles.into_iter().zip(&queries) {
            assert_eq!(handle.join().unwrap(), sorted_dists(&tree, q)[0]);
        }
    });
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_batches_match_sequential() {
    let points = random_points::<3>(31, 800, 20.);
    let tree = KdTree::<f64, 3>::from_points(points);
    let queries = random_points::<3>(32, 64, 25.);

    let nearest = tree.par_nearest(&queries);
    let knn = tree.par_knn(&queries, 5);
    let within = tree.par_radius_search(&queries, 4.);
    for (i, q) in queries.iter().enumerate() {
        assert_eq!(nearest[i], tree.nearest(q));
        assert_eq!(knn[i], tree.knn(q, 5));
        assert_eq!(within[i], tree.radius_search(q, 4.));
    }
}
