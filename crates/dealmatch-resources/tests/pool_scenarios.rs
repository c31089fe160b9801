//! Worker scheduling scenarios: inventory hashing, plan consumption and
//! release against one pool.

use dealmatch_resources::{DeviceGpuHasher, GpuDevice, ResourcePool, Scheduler};
use dealmatch_types::{
    AskPlan, DealMatchError, GpuHasher, GpuSet, NetFlags, NetworkResources, PoolConfig,
    ResourceVector,
};

fn inventory() -> DeviceGpuHasher {
    DeviceGpuHasher::new(
        (0..4)
            .map(|slot| GpuDevice {
                pci_id: format!("PCI:000{slot}:0"),
                vendor_id: 4318,
                device_id: 7041,
                memory: 8 << 30,
                ..GpuDevice::default()
            })
            .collect(),
    )
}

fn worker_capacity(hasher: &DeviceGpuHasher) -> ResourceVector {
    ResourceVector {
        cpu_core_percents: 800,
        ram_bytes: 32 << 30,
        storage_bytes: 1 << 40,
        gpu: hasher.all_devices(),
        network: NetworkResources {
            throughput_in: 1_000_000_000,
            throughput_out: 1_000_000_000,
            net_flags: NetFlags::new(0b111),
        },
    }
}

fn hashed(hasher: &DeviceGpuHasher, indices: &[u64]) -> GpuSet {
    GpuSet::from_hashes(hasher.hash_gpu(indices).unwrap())
}

#[test]
fn pool_normalizes_on_create() {
    let hasher = inventory();
    let config = PoolConfig {
        normalize_on_create: true,
    };
    let pool = ResourcePool::with_config(worker_capacity(&hasher), &config, &hasher).unwrap();
    assert!(pool.capacity().is_normalized());
    assert_eq!(pool.capacity().gpu.len(), 4);

    let raw = ResourcePool::with_config(worker_capacity(&hasher), &PoolConfig::default(), &hasher)
        .unwrap();
    assert!(!raw.capacity().is_normalized());
}

#[test]
fn ask_plan_lifecycle() {
    let hasher = inventory();
    let config = PoolConfig {
        normalize_on_create: true,
    };
    let mut pool = ResourcePool::with_config(worker_capacity(&hasher), &config, &hasher).unwrap();

    let plan_a = ResourceVector {
        cpu_core_percents: 400,
        ram_bytes: 8 << 30,
        gpu: hashed(&hasher, &[0, 1]),
        network: NetworkResources {
            throughput_in: 100_000_000,
            net_flags: NetFlags::new(0b100),
            ..NetworkResources::default()
        },
        ..ResourceVector::default()
    };
    let plan_b = ResourceVector {
        cpu_core_percents: 400,
        ram_bytes: 8 << 30,
        gpu: hashed(&hasher, &[2, 3]),
        ..ResourceVector::default()
    };
    let plan_c = ResourceVector {
        cpu_core_percents: 100,
        gpu: hashed(&hasher, &[1]),
        ..ResourceVector::default()
    };

    pool.consume("ask-a", plan_a.clone()).unwrap();
    pool.consume("ask-b", plan_b).unwrap();

    let free = pool.free().unwrap();
    assert_eq!(free.cpu_core_percents, 0);
    assert_eq!(free.ram_bytes, 16 << 30);
    assert!(free.gpu.is_empty());

    // No CPU left, and GPU 1 is pledged to ask-a.
    assert!(matches!(
        pool.consume("ask-c", plan_c.clone()).unwrap_err(),
        DealMatchError::NotContained(_)
    ));

    assert_eq!(pool.release("ask-a").unwrap(), plan_a);
    pool.consume("ask-c", plan_c).unwrap();

    let free = pool.free().unwrap();
    assert_eq!(free.cpu_core_percents, 300);
    assert_eq!(free.gpu, hashed(&hasher, &[0]));
}

#[test]
fn normalize_rewrites_recorded_plans() {
    let hasher = inventory();
    let mut pool = ResourcePool::new(worker_capacity(&hasher));
    pool.consume(
        "ask-a",
        ResourceVector {
            cpu_core_percents: 100,
            gpu: GpuSet::from_indices([2]),
            ..ResourceVector::default()
        },
    )
    .unwrap();

    pool.normalize(&hasher).unwrap();
    assert!(pool.capacity().is_normalized());
    assert_eq!(pool.consumed("ask-a").unwrap().gpu, hashed(&hasher, &[2]));
    assert_eq!(pool.free().unwrap().gpu, hashed(&hasher, &[0, 1, 3]));
}

#[test]
fn normalize_with_unknown_device_leaves_pool_untouched() {
    let hasher = inventory();
    let mut capacity = worker_capacity(&hasher);
    capacity.gpu = GpuSet::from_indices([0, 9]);
    let mut pool = ResourcePool::new(capacity.clone());

    assert_eq!(
        pool.normalize(&hasher).unwrap_err(),
        DealMatchError::UnknownGpuIndex(9)
    );
    assert_eq!(pool.capacity(), &capacity);
}

#[test]
fn forward_deal_evicts_spot_plan_and_serves_tasks() {
    let hasher = inventory();
    let config = PoolConfig {
        normalize_on_create: true,
    };
    let mut scheduler =
        Scheduler::with_config(worker_capacity(&hasher), &config, &hasher).unwrap();
    assert!(scheduler.plans().capacity().is_normalized());

    let spot = AskPlan::new(
        "spot",
        ResourceVector {
            cpu_core_percents: 800,
            gpu: hashed(&hasher, &[0, 1, 2, 3]),
            ..ResourceVector::default()
        },
        0,
    );
    let forward = AskPlan::new(
        "forward",
        ResourceVector {
            cpu_core_percents: 400,
            storage_bytes: 100 << 30,
            gpu: hashed(&hasher, &[0, 1]),
            ..ResourceVector::default()
        },
        3600,
    );
    scheduler.consume(spot).unwrap();
    scheduler.consume(forward.clone()).unwrap();

    let ejected = scheduler.make_room_and_commit(&forward).unwrap();
    assert_eq!(ejected, vec!["spot".to_string()]);
    assert!(scheduler.plans().is_ejected("spot"));

    let task = ResourceVector {
        storage_bytes: 10 << 30,
        gpu: hashed(&hasher, &[1]),
        ..ResourceVector::default()
    };
    scheduler.consume_task("forward", "task-1", &task).unwrap();
    assert_eq!(scheduler.ask_plan_id_by_task_id("task-1").unwrap(), "forward");
    assert_eq!(scheduler.resource_by_task("task-1").unwrap(), &task);

    scheduler.on_deal_finish("task-1").unwrap();
    scheduler.release("forward").unwrap();
    assert_eq!(
        scheduler.committed_free().unwrap(),
        scheduler.plans().capacity().clone()
    );
}
